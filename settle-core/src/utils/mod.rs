//! General-purpose helpers used by pages and hooks.

mod collections;
mod dates;
mod numbers;
mod strings;
mod urls;

pub use collections::{group_by, remove_nulls, shuffle, shuffle_with};
pub use dates::{format_date, format_time, parse_date, relative_time};
pub use numbers::{clamp, format_integer, format_number};
pub use strings::{capitalize, class_names, to_kebab_case, truncate};
pub use urls::{is_external_url, parse_url};
