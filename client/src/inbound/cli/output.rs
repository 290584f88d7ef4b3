//! JSON rendering for command results.

use std::io::Write;

use serde::Serialize;

use crate::domain::{Error, Session, User};

/// Login and registration result. The token is printed so it can be exported.
#[derive(Serialize)]
pub(super) struct SessionOutput<'a> {
    user: &'a User,
    token: &'a str,
}

impl<'a> From<&'a Session> for SessionOutput<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            user: session.user(),
            token: session.token().expose(),
        }
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub(super) fn write_json<T>(out: &mut dyn Write, value: &T) -> Result<(), Error>
where
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|error| Error::internal(format!("failed to render output: {error}")))?;
    writeln!(out).map_err(|error| Error::internal(format!("failed to write output: {error}")))
}

/// Render `error` as JSON for stderr.
pub fn render_error(out: &mut dyn Write, error: &Error) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "error": error }))?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    //! Rendering coverage for command output.

    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    #[rstest]
    fn values_are_written_as_json_lines() {
        let mut buffer = Vec::new();

        write_json(&mut buffer, &json!({ "deleted": "consent-1" })).expect("written");

        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.ends_with('\n'));
        let parsed: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(parsed, json!({ "deleted": "consent-1" }));
    }

    #[rstest]
    fn errors_render_code_message_and_details() {
        let mut buffer = Vec::new();
        let error = Error::invalid_request("title must not be blank")
            .with_details(json!({ "field": "title" }));

        render_error(&mut buffer, &error).expect("written");

        let parsed: Value = serde_json::from_slice(&buffer).expect("valid json");
        assert_eq!(
            parsed,
            json!({
                "error": {
                    "code": "invalid_request",
                    "message": "title must not be blank",
                    "details": { "field": "title" },
                }
            })
        );
    }
}
