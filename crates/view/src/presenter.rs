#![forbid(unsafe_code)]

use meshdash_api::HttpError;
use tracing::info;

use crate::surfaces::{AlertDialogConfig, Dialogs};

pub const ALERT_WIDTH: &str = "630px";
pub const INTERNAL_SERVER_ERROR_TITLE: &str = "Internal server error";
pub const FALLBACK_MESSAGE: &str = "Could not perform the operation.";
pub const CONFIRM_LABEL: &str = "OK";

/// Alert contents for an error response. A status text of "OK" means the
/// error object carried no real status and gets the generic title.
pub fn alert_for(err: &HttpError) -> AlertDialogConfig {
    let title = if err.status_text == "OK" {
        INTERNAL_SERVER_ERROR_TITLE.to_string()
    } else {
        err.status_text.clone()
    };
    let message = err
        .payload
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(FALLBACK_MESSAGE)
        .to_string();
    AlertDialogConfig { width: ALERT_WIDTH.to_string(), title, message, confirm_label: CONFIRM_LABEL.to_string() }
}

/// Open an alert for `err`; returns whether one was opened.
pub fn present_error(dialogs: &dyn Dialogs, err: Option<&HttpError>) -> bool {
    let Some(err) = err else { return false };
    let cfg = alert_for(err);
    info!(status = err.status, title = %cfg.title, "view: presenting error");
    dialogs.open_alert(cfg);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<AlertDialogConfig>>);

    impl Dialogs for Recorder {
        fn open_alert(&self, cfg: AlertDialogConfig) { self.0.lock().unwrap().push(cfg); }
    }

    #[test]
    fn ok_status_text_gets_generic_title() {
        let cfg = alert_for(&HttpError::new(200, "OK", None));
        assert_eq!(cfg.title, "Internal server error");
        assert_eq!(cfg.message, "Could not perform the operation.");
        assert_eq!(cfg.confirm_label, "OK");
        assert_eq!(cfg.width, "630px");
    }

    #[test]
    fn status_text_and_payload_are_shown() {
        let cfg = alert_for(&HttpError::new(403, "Forbidden", Some("quota exceeded".into())));
        assert_eq!(cfg.title, "Forbidden");
        assert_eq!(cfg.message, "quota exceeded");
    }

    #[test]
    fn empty_payload_falls_back() {
        let cfg = alert_for(&HttpError::new(500, "Internal Server Error", Some(String::new())));
        assert_eq!(cfg.message, FALLBACK_MESSAGE);
    }

    #[test]
    fn none_is_a_no_op() {
        let rec = Recorder::default();
        assert!(!present_error(&rec, None));
        assert!(rec.0.lock().unwrap().is_empty());
        assert!(present_error(&rec, Some(&HttpError::new(409, "Conflict", None))));
        assert_eq!(rec.0.lock().unwrap()[0].title, "Conflict");
    }
}
