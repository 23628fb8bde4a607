//! Keeps the SparkPost suppression list in sync with the CRM hold flag.
//!
//! When an email address comes off hold in the CRM, SparkPost must stop
//! suppressing it too. The pre-edit observer captures the stored flag and
//! hands a `HoldTransition` to the post-edit handler for the same edit.

use crate::api::Endpoint;
use crate::client::Dispatcher;
use crate::error::Error;

/// Hold flag state around a single email edit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoldTransition {
    pub previously_on_hold: bool,
    pub now_on_hold: bool,
}

impl HoldTransition {
    /// True only when the edit clears a hold that was set
    pub fn releases_hold(&self) -> bool {
        self.previously_on_hold && !self.now_on_hold
    }
}

/// Capture the hold state before an email edit is applied
pub fn observe_pre_edit(stored_on_hold: bool, requested_on_hold: bool) -> HoldTransition {
    HoldTransition {
        previously_on_hold: stored_on_hold,
        now_on_hold: requested_on_hold,
    }
}

/// Remove `email` from the suppression list if the edit released its hold.
///
/// Failures are logged and swallowed. Returns whether a removal call was made.
pub fn handle_post_edit<D: Dispatcher + ?Sized>(
    transition: HoldTransition,
    email: &str,
    dispatcher: &D,
) -> bool {
    let email = email.trim();

    if !transition.releases_hold() || email.is_empty() {
        return false;
    }

    let result = dispatcher
        .call(Endpoint::SuppressionList(email.to_string()), &[], None)
        .map_err(|e| Error::SuppressionSync(format!("{}: {}", email, e)));

    match result {
        Ok(_) => log::info!("Removed {} from the suppression list", email),
        Err(e) => log::warn!("{}", e),
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Response;
    use crate::transmission::TransmissionRequest;
    use std::cell::RefCell;

    struct Recorder {
        calls: RefCell<Vec<Endpoint>>,
        fail: bool,
    }

    impl Recorder {
        fn new(fail: bool) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail,
            }
        }
    }

    impl Dispatcher for Recorder {
        fn call(
            &self,
            endpoint: Endpoint,
            _query: &[(&str, &str)],
            _body: Option<&TransmissionRequest>,
        ) -> Result<Response, Error> {
            self.calls.borrow_mut().push(endpoint);
            if self.fail {
                Err(Error::dispatch(Some(404), "Recipient could not be found"))
            } else {
                Ok(Response::Null)
            }
        }
    }

    #[test]
    fn test_only_released_hold_triggers_removal() {
        let cases = [
            (true, false, 1),
            (true, true, 0),
            (false, false, 0),
            (false, true, 0),
        ];

        for &(before, after, expected) in cases.iter() {
            let recorder = Recorder::new(false);
            let transition = observe_pre_edit(before, after);
            handle_post_edit(transition, "nicolas@cividesk.com", &recorder);

            let calls = recorder.calls.borrow();
            assert_eq!(calls.len(), expected, "before={} after={}", before, after);
            if expected == 1 {
                assert_eq!(
                    calls[0],
                    Endpoint::SuppressionList("nicolas@cividesk.com".to_string())
                );
            }
        }
    }

    #[test]
    fn test_failure_is_swallowed() {
        let recorder = Recorder::new(true);
        let issued = handle_post_edit(observe_pre_edit(true, false), "a@x.com", &recorder);

        assert!(issued);
        assert_eq!(recorder.calls.borrow().len(), 1);
    }

    #[test]
    fn test_empty_email_issues_no_call() {
        let recorder = Recorder::new(false);
        let issued = handle_post_edit(observe_pre_edit(true, false), "  ", &recorder);

        assert!(!issued);
        assert!(recorder.calls.borrow().is_empty());
    }
}
