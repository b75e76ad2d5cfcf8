use super::*;

#[test]
fn form_carries_fixed_workflow_fields() {
    let credentials = Credentials {
        username: "s1234567".to_string(),
        password: "hunter2".to_string(),
    };
    let form = login_form(&credentials, "9f3acd01");

    assert!(form.contains(&("wfId", "nwf_PTW0000002_login")));
    assert!(form.contains(&("userName", "s1234567")));
    assert!(form.contains(&("password", "hunter2")));
    assert!(form.contains(&("locale", "ja_JP")));
    assert!(form.contains(&("action", "rwf")));
    assert!(form.contains(&("tabId", "home")));
    assert!(form.contains(&("rwfHash", "9f3acd01")));
}

#[test]
fn form_tolerates_missing_token() {
    let credentials = Credentials {
        username: "s1234567".to_string(),
        password: "hunter2".to_string(),
    };
    // The token's absence is diagnosed but never fatal; the field is
    // submitted empty.
    let form = login_form(&credentials, "");
    assert!(form.contains(&("rwfHash", "")));
}

#[test]
fn marker_detected_in_either_language() {
    assert!(contains_logout_marker("<a href=\"#\">ログアウト</a>"));
    assert!(contains_logout_marker("<a href=\"#\">Logout</a>"));
    assert!(!contains_logout_marker("<a href=\"#\">ログイン</a>"));
}
