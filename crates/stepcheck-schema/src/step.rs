//! The bundled step descriptor schema.
//!
//! `STEP_SCHEMA` is the draft-07 schema for `step.yml` files. The default
//! warning rules in [`crate::classify`] are written against the schema
//! pointers it produces, so the two must change together.

/// Resource name the bundled schema is compiled under.
pub const STEP_SCHEMA_RESOURCE: &str = "step.schema.json";

/// JSON text of the bundled step schema.
pub const STEP_SCHEMA: &str = include_str!("../schemas/step.schema.json");
