//! Property-based tests for core domain types.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use ugh::core::types::{
    parse_release_tag, LineageVersion, ReleaseLineage, ReleaseType, RepositoryId,
};
use ugh::engine::release::append_line;

/// Strategy for repository name segments.
fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.-]{1,20}"
}

proptest! {
    #[test]
    fn two_segment_versions_render_canonically(major in 0u64..10_000, minor in 0u64..10_000) {
        let v = LineageVersion::parse(&format!("{}.{}", major, minor)).unwrap();
        prop_assert_eq!(v.to_string(), format!("{}.{}.x", major, minor));
        let branch = format!("{}.{}.x", major, minor);
        prop_assert!(v.matches_branch(&branch));
    }

    #[test]
    fn patch_segment_is_discarded(major in 0u64..1000, minor in 0u64..1000, patch in 0u64..1000) {
        let with_patch = LineageVersion::parse(&format!("{}.{}.{}", major, minor, patch)).unwrap();
        let without = LineageVersion::parse(&format!("{}.{}", major, minor)).unwrap();
        prop_assert_eq!(with_patch, without);
    }

    #[test]
    fn canonical_form_reparses(major in 0u64..1000, minor in 0u64..1000) {
        let v = LineageVersion::new(major, minor);
        prop_assert_eq!(LineageVersion::parse(&v.to_string()).unwrap(), v);
    }

    #[test]
    fn wrong_segment_count_fails(parts in prop::collection::vec(0u64..100, 0..8)) {
        prop_assume!(parts.len() < 2 || parts.len() > 3);
        let text = parts.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
        prop_assert!(LineageVersion::parse(&text).is_err());
    }

    #[test]
    fn negative_or_non_numeric_fails(major in -1000i64..-1, word in "[a-wyz]{1,5}") {
        let negative = format!("{}.2", major);
        let minor_is_negative = format!("2.{}", major);
        let alpha = format!("{}.2", word);
        prop_assert!(LineageVersion::parse(&negative).is_err());
        prop_assert!(LineageVersion::parse(&minor_is_negative).is_err());
        prop_assert!(LineageVersion::parse(&alpha).is_err());
    }

    #[test]
    fn previous_is_minor_minus_one(major in 0u64..1000, minor in 1u64..1000) {
        let lineage = ReleaseLineage::new(LineageVersion::new(major, minor), None);
        prop_assert_eq!(lineage.previous().unwrap(), LineageVersion::new(major, minor - 1));
    }

    #[test]
    fn major_release_needs_explicit_previous(major in 0u64..1000, prev_major in 0u64..1000, prev_minor in 0u64..1000) {
        let version = LineageVersion::new(major, 0);
        prop_assert!(ReleaseLineage::new(version, None).previous().is_err());

        let explicit = LineageVersion::new(prev_major, prev_minor);
        prop_assert_eq!(
            ReleaseLineage::new(version, Some(explicit)).previous().unwrap(),
            explicit
        );
    }

    #[test]
    fn increments_follow_semver(major in 0u64..100, minor in 0u64..100, patch in 0u64..100) {
        let base = semver::Version::new(major, minor, patch);
        prop_assert_eq!(
            ReleaseType::Patch.increment(&base).unwrap(),
            semver::Version::new(major, minor, patch + 1)
        );
        prop_assert_eq!(
            ReleaseType::Minor.increment(&base).unwrap(),
            semver::Version::new(major, minor + 1, 0)
        );
    }

    #[test]
    fn release_tags_with_or_without_v(major in 0u64..100, minor in 0u64..100, patch in 0u64..100) {
        let plain = parse_release_tag(&format!("{}.{}.{}", major, minor, patch)).unwrap();
        let prefixed = parse_release_tag(&format!("v{}.{}.{}", major, minor, patch)).unwrap();
        prop_assert_eq!(plain, prefixed);
    }

    #[test]
    fn repository_roundtrip(owner in segment(), name in segment()) {
        let text = format!("{}/{}", owner, name);
        let repo = RepositoryId::parse(&text).unwrap();
        prop_assert_eq!(repo.owner(), owner.as_str());
        prop_assert_eq!(repo.name(), name.as_str());
        prop_assert_eq!(repo.to_string(), text);
    }

    #[test]
    fn repository_rejects_extra_segments(a in segment(), b in segment(), c in segment()) {
        let three_segments = format!("{}/{}/{}", a, b, c);
        let leading_slash = format!("/{}", a);
        prop_assert!(RepositoryId::parse(&three_segments).is_err());
        prop_assert!(RepositoryId::parse(&a).is_err());
        prop_assert!(RepositoryId::parse(&leading_slash).is_err());
    }

    #[test]
    fn append_only_grows(lines in prop::collection::vec("[* A-Za-z0-9#]{1,30}", 1..10)) {
        let mut body = String::new();
        for line in &lines {
            body = append_line(&body, line);
        }
        prop_assert_eq!(body.lines().count(), lines.len());
        prop_assert_eq!(body.lines().last(), lines.last().map(String::as_str));
    }
}
