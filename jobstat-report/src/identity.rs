// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical test identities.
//!
//! The same logical test must keep a single identity across a job history
//! that spans both report layouts, so legacy `(class path, name)` pairs are
//! rewritten into the `file.py Class.method` form used by current reports.

/// Returns the canonical identity for a legacy row.
///
/// A class path of exactly two non-empty dotted components `file.Class` yields
/// `file.py Class.name`. Any other class path yields the test name alone.
pub fn legacy_identity(class_path: &str, name: &str) -> String {
    let mut components = class_path.split('.');
    match (components.next(), components.next(), components.next()) {
        (Some(file_stem), Some(class_name), None)
            if !file_stem.trim().is_empty() && !class_name.trim().is_empty() =>
        {
            format!(
                "{}.py {}.{}",
                file_stem.trim(),
                class_name.trim(),
                name.trim()
            )
        }
        _ => name.trim().to_owned(),
    }
}

/// Returns the canonical identity for a current row.
pub fn current_identity(name: &str) -> String {
    name.trim().to_owned()
}

/// Returns the short display form of an identity.
///
/// `file.py Class.method` abbreviates to `method`; identities of any other
/// shape are returned unchanged.
pub fn abbreviate(identity: &str) -> &str {
    match identity.split_once(' ') {
        Some((_, qualified)) if !qualified.contains(' ') => {
            qualified.rsplit('.').next().unwrap_or(qualified)
        }
        _ => identity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("mod_foo.TestBar", "test_baz", "mod_foo.py TestBar.test_baz"; "file and class")]
    #[test_case(" mod_foo . TestBar ", " test_baz ", "mod_foo.py TestBar.test_baz"; "untrimmed")]
    #[test_case("weird", "test_baz", "test_baz"; "single component")]
    #[test_case("", "test_baz", "test_baz"; "empty class")]
    #[test_case("a.b.C", "test_baz", "test_baz"; "three components")]
    #[test_case("mod_foo.", "test_baz", "test_baz"; "empty class name")]
    #[test_case(".TestBar", "test_baz", "test_baz"; "empty file stem")]
    fn legacy(class_path: &str, name: &str, expected: &str) {
        assert_eq!(legacy_identity(class_path, name), expected);
    }

    #[test]
    fn legacy_and_current_agree() {
        assert_eq!(
            legacy_identity("test_settings.TestSettings", "test_wifi"),
            current_identity("  test_settings.py TestSettings.test_wifi "),
        );
    }

    #[test_case("test_settings.py TestSettings.test_wifi", "test_wifi"; "qualified")]
    #[test_case("test_settings.py", "test_settings.py"; "file only")]
    #[test_case("test_boot", "test_boot"; "bare name")]
    #[test_case("a.py b c", "a.py b c"; "too many parts")]
    fn abbreviated(identity: &str, expected: &str) {
        assert_eq!(abbreviate(identity), expected);
    }
}
