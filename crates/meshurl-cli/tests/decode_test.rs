//! Integration tests for `meshurl decode`.

use assert_cmd::Command;
use predicates::prelude::*;

/// Single primary channel named "Default".
const DEFAULT_CHANNEL_B64: &str = "CgkSB0RlZmF1bHQQAQ";

fn meshurl_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_meshurl"));
    // Suppress tracing output during tests
    cmd.env("RUST_LOG", "error");
    cmd
}

mod decode {
    use super::*;

    #[test]
    fn decodes_fragment_url_to_json() {
        meshurl_cmd()
            .arg("decode")
            .arg(format!("https://meshtastic.org/e/#{DEFAULT_CHANNEL_B64}"))
            .assert()
            .success()
            .stdout(predicate::str::contains("\"success\":true"))
            .stdout(predicate::str::contains("\"kind\":\"channel\""))
            .stdout(predicate::str::contains("Default"))
            .stdout(predicate::str::contains("PRIMARY"));
    }

    #[test]
    fn decodes_query_url_to_json() {
        meshurl_cmd()
            .arg("decode")
            .arg(format!("https://meshtastic.org/e/?c={DEFAULT_CHANNEL_B64}"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Default"));
    }

    #[test]
    fn accepts_bare_payload() {
        meshurl_cmd()
            .arg("decode")
            .arg(DEFAULT_CHANNEL_B64)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"success\":true"));
    }

    #[test]
    fn pretty_flag_indents_output() {
        meshurl_cmd()
            .arg("decode")
            .arg(DEFAULT_CHANNEL_B64)
            .arg("--pretty")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"success\": true"));
    }

    #[test]
    fn summary_is_human_readable() {
        meshurl_cmd()
            .arg("decode")
            .arg(DEFAULT_CHANNEL_B64)
            .arg("--summary")
            .assert()
            .success()
            .stdout(predicate::str::contains("Single channel"))
            .stdout(predicate::str::contains("Default"))
            .stdout(predicate::str::contains("primary"));
    }

    #[test]
    fn url_without_payload_fails_with_envelope() {
        meshurl_cmd()
            .arg("decode")
            .arg("https://meshtastic.org/e/")
            .assert()
            .failure()
            .stdout(predicate::str::contains("\"success\":false"))
            .stdout(predicate::str::contains("no encoded channel data"));
    }

    #[test]
    fn invalid_base64_reports_encoded_length() {
        meshurl_cmd()
            .arg("decode")
            .arg("https://meshtastic.org/e/#!!!bad!!!")
            .assert()
            .failure()
            .stdout(predicate::str::contains("invalid base64url payload"))
            .stdout(predicate::str::contains("\"encoded_length\":9"));
    }

    #[test]
    fn unrecognizable_payload_includes_hex_dump() {
        // valid base64, but the bytes match neither message shape
        meshurl_cmd()
            .arg("decode")
            .arg("https://meshtastic.org/e/#AAAA")
            .assert()
            .failure()
            .stdout(predicate::str::contains("\"success\":false"))
            .stdout(predicate::str::contains("\"hex_data\":\"000000\""));
    }

    #[test]
    fn summary_failure_is_plain_text() {
        meshurl_cmd()
            .arg("decode")
            .arg("https://meshtastic.org/e/")
            .arg("--summary")
            .assert()
            .failure()
            .stdout(predicate::str::contains("Decoding failed"));
    }
}
