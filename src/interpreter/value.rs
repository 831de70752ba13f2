/// Script aggregate values.
///
/// Defines the shared state behind struct instances: an insertion-ordered
/// member table plus the method table every instance of the struct shares.
/// Deep copies re-create the member table; methods bind their receiver at
/// dispatch time, so copies never need fixing up.
pub mod aggregate;
/// Core value representation.
///
/// Defines the `Value` handle and the `Primitive` variants it can carry,
/// along with type names, zero values, and the C-style numeric conversions
/// used by operators, assignments and the host boundary.
pub mod core;
/// Host-registered types and values.
///
/// Defines `HostType` — the record of constructors, field accessors,
/// methods and indexers a host registers for one of its Rust types — and
/// `HostValue`, the reference-counted opaque datum the evaluator threads
/// through scripts.
pub mod host;
