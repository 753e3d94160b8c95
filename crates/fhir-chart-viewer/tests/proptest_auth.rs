//! Property-based tests for PKCE secrets, the authorization URL and
//! display formatting.

use std::collections::HashMap;

use proptest::prelude::*;

use fhir_chart_viewer::auth::pkce::challenge_s256;
use fhir_chart_viewer::auth::request::AuthorizationRequest;
use fhir_chart_viewer::config::Config;
use fhir_chart_viewer::render::{format_display_date, html_escape};

proptest! {
    /// S256 challenges are always 43 URL-safe characters without padding.
    #[test]
    fn challenge_shape(verifier in "[0-9a-f]{64}|.{0,200}") {
        let challenge = challenge_s256(&verifier);
        prop_assert_eq!(challenge.len(), 43);
        prop_assert!(challenge.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        prop_assert_eq!(challenge_s256(&verifier), challenge);
    }

    /// Different verifiers never share a challenge.
    #[test]
    fn challenge_binds_verifier(a in "[0-9a-f]{64}", b in "[0-9a-f]{64}") {
        prop_assume!(a != b);
        prop_assert_ne!(challenge_s256(&a), challenge_s256(&b));
    }

    /// A 32-byte secret survives hex encoding losslessly.
    #[test]
    fn hex_roundtrip(bytes in proptest::array::uniform32(any::<u8>())) {
        let encoded = hex::encode(bytes);
        prop_assert_eq!(encoded.len(), 64);
        prop_assert_eq!(hex::decode(&encoded).unwrap(), bytes.to_vec());
    }

    /// Every parameter survives URL encoding unchanged.
    #[test]
    fn authorization_url_preserves_values(
        client_id in "[ -~]{1,40}",
        scope in "[a-zA-Z/ .*]{1,40}",
        state in "[0-9a-f]{64}",
    ) {
        let config =
            Config { client_id: client_id.clone(), scope: scope.clone(), ..Config::default() };
        let challenge = challenge_s256(&state);
        let request = AuthorizationRequest::new(&config, &state, &challenge);
        let url = request.to_url(&config.authorization_url).unwrap();

        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        prop_assert_eq!(query.len(), 8);
        prop_assert_eq!(&query["client_id"], &client_id);
        prop_assert_eq!(&query["scope"], &scope);
        prop_assert_eq!(&query["state"], &state);
        prop_assert_eq!(&query["code_challenge"], &challenge);
        prop_assert_eq!(&query["aud"], &config.fhir_base_url);
    }

    /// Escaped text cannot open or close markup.
    #[test]
    fn escaped_text_has_no_markup(text in ".{0,200}") {
        let escaped = html_escape(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
        prop_assert!(!escaped.contains('\''));
    }

    /// Calendar dates render as M/D/YYYY without leading zeros.
    #[test]
    fn date_display(year in 1900i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let raw = format!("{year:04}-{month:02}-{day:02}");
        prop_assert_eq!(format_display_date(&raw), format!("{month}/{day}/{year}"));
    }
}
