//! Typed access to configuration facts.
//!
//! Implementors provide two primitives (raw option lookup and section
//! enumeration); every typed accessor is a provided method on top of them.
//! Values follow Fortran namelist conventions: logicals are `.true.` /
//! `.false.`, strings may be wrapped in single quotes, and arrays are comma
//! separated.

use datasz_common::{DataszError, DataszResult};

pub trait ConfigFacts {
    /// Raw value of an active option. Absent and ignored options both give `None`.
    fn value(&self, section: &str, option: &str) -> Option<&str>;

    /// Names of active sections starting with `prefix`, in sorted order.
    fn sections_with_prefix(&self, prefix: &str) -> Vec<&str>;

    /// True when the option is present and not ignored.
    fn is_active(&self, section: &str, option: &str) -> bool {
        self.value(section, option).is_some()
    }

    fn require(&self, section: &str, option: &str) -> DataszResult<&str> {
        self.value(section, option)
            .ok_or_else(|| DataszError::missing(section, option))
    }

    fn integer(&self, section: &str, option: &str) -> DataszResult<i64> {
        parse_integer(section, option, self.require(section, option)?)
    }

    fn opt_integer(&self, section: &str, option: &str) -> DataszResult<Option<i64>> {
        self.value(section, option)
            .map(|raw| parse_integer(section, option, raw))
            .transpose()
    }

    fn logical(&self, section: &str, option: &str) -> DataszResult<bool> {
        parse_logical(section, option, self.require(section, option)?)
    }

    fn character(&self, section: &str, option: &str) -> DataszResult<String> {
        Ok(unquote(self.require(section, option)?).to_string())
    }

    fn integer_array(&self, section: &str, option: &str) -> DataszResult<Vec<i64>> {
        split_array(self.require(section, option)?)
            .map(|element| parse_integer(section, option, element))
            .collect()
    }

    fn opt_integer_array(&self, section: &str, option: &str) -> DataszResult<Option<Vec<i64>>> {
        if self.is_active(section, option) {
            self.integer_array(section, option).map(Some)
        } else {
            Ok(None)
        }
    }

    fn real_array(&self, section: &str, option: &str) -> DataszResult<Vec<f64>> {
        split_array(self.require(section, option)?)
            .map(|element| parse_real(section, option, element))
            .collect()
    }

    fn opt_real_array(&self, section: &str, option: &str) -> DataszResult<Option<Vec<f64>>> {
        if self.is_active(section, option) {
            self.real_array(section, option).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Strip surrounding whitespace and single quotes.
pub fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches('\'')
}

/// Split an array value on commas and line breaks, dropping blank elements.
pub fn split_array(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([',', '\n'])
        .map(unquote)
        .filter(|element| !element.is_empty())
}

pub fn parse_integer(section: &str, option: &str, raw: &str) -> DataszResult<i64> {
    let cleaned = unquote(raw);
    cleaned
        .parse()
        .map_err(|_| DataszError::invalid(section, option, cleaned, "expected an integer"))
}

pub fn parse_real(section: &str, option: &str, raw: &str) -> DataszResult<f64> {
    let cleaned = unquote(raw);
    // Fortran double-precision exponents use 'd'
    cleaned
        .replace(['d', 'D'], "e")
        .parse()
        .map_err(|_| DataszError::invalid(section, option, cleaned, "expected a real number"))
}

pub fn parse_logical(section: &str, option: &str, raw: &str) -> DataszResult<bool> {
    match unquote(raw).to_ascii_lowercase().as_str() {
        ".true." | ".t." | "true" => Ok(true),
        ".false." | ".f." | "false" => Ok(false),
        other => Err(DataszError::invalid(
            section,
            option,
            other,
            "expected .true. or .false.",
        )),
    }
}
