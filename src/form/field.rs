use serde::{Serialize, Serializer};

/// Last raw input paired with its decode result.
///
/// `val` is only ever produced by running the field's decoder over `raw`,
/// both on construction and on every `update`.
#[derive(Clone)]
pub struct FormField<E, Raw, Valid> {
    raw: Raw,
    val: Result<Valid, E>,
    dirty: bool,
    decoder: fn(&Raw) -> Result<Valid, E>,
}

impl<E, Raw, Valid> FormField<E, Raw, Valid> {
    pub fn new(decoder: fn(&Raw) -> Result<Valid, E>, raw: Raw) -> Self {
        let val = decoder(&raw);
        Self {
            raw,
            val,
            dirty: false,
            decoder,
        }
    }

    pub fn update(&mut self, raw: Raw) {
        self.val = (self.decoder)(&raw);
        self.raw = raw;
        self.dirty = true;
    }

    pub fn raw(&self) -> &Raw {
        &self.raw
    }

    pub fn val(&self) -> &Result<Valid, E> {
        &self.val
    }

    pub fn value(&self) -> Option<&Valid> {
        self.val.as_ref().ok()
    }

    pub fn error(&self) -> Option<&E> {
        self.val.as_ref().err()
    }

    pub fn is_valid(&self) -> bool {
        self.val.is_ok()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn error_visible(&self, errors_enabled: bool) -> bool {
        self.val.is_err() && (self.dirty || errors_enabled)
    }
}

impl<E, Raw, Valid> std::fmt::Debug for FormField<E, Raw, Valid>
where
    E: std::fmt::Debug,
    Raw: std::fmt::Debug,
    Valid: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormField")
            .field("raw", &self.raw)
            .field("val", &self.val)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl<E, Raw, Valid> PartialEq for FormField<E, Raw, Valid>
where
    E: PartialEq,
    Raw: PartialEq,
    Valid: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.val == other.val && self.dirty == other.dirty
    }
}

/// Snapshots only care about what the user typed.
impl<E, Raw, Valid> Serialize for FormField<E, Raw, Valid>
where
    Raw: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}
