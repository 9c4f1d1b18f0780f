//! Getting customer records in.
//!
//! - [`table`]: CSV upload, one record per row.
//! - [`form`]: single-customer entry from `FIELD=VALUE` pairs, with the
//!   advisory bounds and defaults an entry form applies.

pub mod form;
pub mod table;
