//! S3 error responses.
//!
//! Errors are rendered as the flat S3 `<Error>` document:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Error>
//!   <Code>AccessDenied</Code>
//!   <Message>Access Denied</Message>
//!   <Resource>/mybucket/key</Resource>
//!   <RequestId>4442587FB7D0A2F9</RequestId>
//! </Error>
//! ```

use std::io;

use http::header::HeaderValue;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use s3gate_model::S3Error;

use crate::body::GateResponseBody;

/// Header carrying the request ID on every gate response.
pub const REQUEST_ID_HEADER: &str = "x-amz-request-id";

/// Format an S3 error as XML.
#[must_use]
pub fn error_to_xml(
    code: &str,
    message: &str,
    resource: Option<&str>,
    request_id: &str,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    if let Err(e) = write_error_xml(&mut buf, code, message, resource, request_id) {
        tracing::error!(error = %e, "failed to serialize S3 error XML");
        buf.clear();
    }
    buf
}

fn write_error_xml(
    buf: &mut Vec<u8>,
    code: &str,
    message: &str,
    resource: Option<&str>,
    request_id: &str,
) -> io::Result<()> {
    let mut writer = Writer::new(buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.create_element("Error").write_inner_content(|w| {
        w.create_element("Code")
            .write_text_content(BytesText::new(code))?;
        w.create_element("Message")
            .write_text_content(BytesText::new(message))?;
        if let Some(res) = resource {
            w.create_element("Resource")
                .write_text_content(BytesText::new(res))?;
        }
        w.create_element("RequestId")
            .write_text_content(BytesText::new(request_id))?;
        Ok(())
    })?;

    Ok(())
}

/// Convert an [`S3Error`] into an HTTP response.
///
/// `HEAD` responses carry the status and headers only.
#[must_use]
pub fn error_to_response(
    err: &S3Error,
    method: &http::Method,
    request_id: &str,
) -> http::Response<GateResponseBody> {
    let body = if *method == http::Method::HEAD {
        GateResponseBody::empty()
    } else {
        GateResponseBody::from_bytes(error_to_xml(
            err.code.as_str(),
            &err.message,
            err.resource.as_deref(),
            request_id,
        ))
    };

    let mut response = http::Response::builder()
        .status(err.status_code)
        .header(http::header::CONTENT_TYPE, "application/xml")
        .body(body)
        .unwrap_or_else(|_| {
            http::Response::builder()
                .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                .body(GateResponseBody::empty())
                .expect("static response should be valid")
        });
    set_request_id(&mut response, request_id);
    response
}

/// Set `x-amz-request-id` unless the response already carries one.
pub fn set_request_id<B>(response: &mut http::Response<B>, request_id: &str) {
    if let Ok(hv) = HeaderValue::from_str(request_id) {
        response
            .headers_mut()
            .entry(REQUEST_ID_HEADER)
            .or_insert(hv);
    }
}
