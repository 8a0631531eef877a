use crate::error::EngineError;
use crate::http::request::RequestLine;

/// Extracts the request line from the raw bytes of a freshly read request.
///
/// Only the first line is looked at. Trailing `\r`/`\n` are stripped and the
/// rest is split on ASCII whitespace; anything other than exactly three
/// tokens is a [`EngineError::MalformedRequest`]. Bytes are decoded one
/// byte per char (ISO-8859-1) so every token round-trips verbatim.
pub fn parse_request_line(buf: &[u8]) -> Result<RequestLine, EngineError> {
    let line = first_line(buf);

    let tokens: Vec<&[u8]> = line
        .split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .collect();

    match tokens.as_slice() {
        [method, path, version] => Ok(RequestLine {
            method: latin1(method),
            path: latin1(path),
            version: latin1(version),
        }),
        _ => Err(EngineError::MalformedRequest(latin1(line))),
    }
}

fn first_line(buf: &[u8]) -> &[u8] {
    let end = buf
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(buf.len());

    let mut line = &buf[..end];
    while let [rest @ .., b'\r' | b'\n'] = line {
        line = rest;
    }
    line
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
