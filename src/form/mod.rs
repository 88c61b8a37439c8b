pub mod decoders;
pub mod errors;
pub mod field;

pub use decoders::{
    decode_date, decode_energy_level, decode_latitude, decode_longitude, decode_optional_text,
    decode_required_text, decode_time, energy_level_validation, MIN_OTHER_HAZARD_ENERGY_LEVEL,
};
pub use errors::{first_error, FieldError, FormValidationError};
pub use field::FormField;
