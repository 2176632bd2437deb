//! The dcb module maps the raw Device Control Block to named, typed fields and back.
//!
//! - [`model`]: thermostat model and program mode
//! - [`layout`]: per-model read offsets
//! - [`decode`]: DCB bytes to [`DecodedRecord`]
//! - [`encode`]: writable field table and value encoding
//! - [`value`]: decoded values and trigger groups

pub mod decode;
pub mod encode;
pub mod layout;
pub mod model;
pub mod value;

pub use decode::{decode, decode_with_model};
pub use encode::{
    encode_field, encode_field_at, encode_spec, lookup, lookup_any_model, parse_field_value, EncodedField, FieldKind,
    FieldSpec, FieldValue, READ_ONLY_FIELDS,
};
pub use layout::Layout;
pub use model::{DeviceModel, ProgramMode};
pub use value::{DecodedRecord, HeatTrigger, HotWaterTrigger, TriggerGroup, Value};
