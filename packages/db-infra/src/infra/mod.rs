//! Database infrastructure: driver dispatch, connection lifecycle, migrations and probing.

pub mod db;
