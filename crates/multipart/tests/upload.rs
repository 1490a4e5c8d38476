use micro_multipart::{Boundary, Multipart, MultipartError, Part};
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).with_test_writer().finish();
        // another test binary may have installed one already
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[derive(Debug, PartialEq, Eq)]
struct Field {
    name: String,
    filename: Option<String>,
    headers: Vec<(String, String)>,
    data: Vec<u8>,
}

/// Splits a multipart body into its fields, enough to check the encoder.
fn parse(body: &[u8], boundary: &str) -> Vec<Field> {
    let open = format!("--{boundary}");
    let delimiter = format!("\r\n--{boundary}");
    assert!(body.starts_with(open.as_bytes()), "body must start with the boundary");

    let mut fields = Vec::new();
    let mut rest = &body[open.len()..];
    loop {
        if rest.starts_with(b"--") {
            assert_eq!(&rest[2..], b"\r\n", "nothing may follow the closing delimiter");
            return fields;
        }

        rest = rest.strip_prefix(b"\r\n").expect("delimiter must end with CRLF");
        let end = rest
            .windows(delimiter.len())
            .position(|window| window == delimiter.as_bytes())
            .expect("part must be followed by a delimiter");
        fields.push(parse_field(&rest[..end]));
        rest = &rest[end + delimiter.len()..];
    }
}

fn parse_field(part: &[u8]) -> Field {
    let mut raw_headers = [httparse::EMPTY_HEADER; 16];
    let httparse::Status::Complete((consumed, raw_headers)) = httparse::parse_headers(part, &mut raw_headers).unwrap()
    else {
        panic!("incomplete part headers");
    };

    let headers: Vec<(String, String)> = raw_headers
        .iter()
        .map(|h| (h.name.to_owned(), String::from_utf8(h.value.to_vec()).unwrap()))
        .collect();

    let disposition = &headers.iter().find(|(name, _)| name.eq_ignore_ascii_case("content-disposition")).unwrap().1;
    let params = disposition_params(disposition);
    let param = |key: &str| params.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());

    Field { name: param("name").unwrap(), filename: param("filename"), headers, data: part[consumed..].to_vec() }
}

// parses `form-data; key="quoted \"value\""; ...`, undoing backslash escapes
fn disposition_params(value: &str) -> Vec<(String, String)> {
    let rest = value.strip_prefix("form-data").unwrap();
    let mut chars = rest.chars().peekable();
    let mut params = Vec::new();

    while chars.next() == Some(';') {
        while chars.peek() == Some(&' ') {
            chars.next();
        }

        let key: String = chars.by_ref().take_while(|c| *c != '=').collect();
        assert_eq!(chars.next(), Some('"'));

        let mut value = String::new();
        loop {
            match chars.next().expect("unterminated quoted string") {
                '\\' => value.extend(chars.next()),
                '"' => break,
                c => value.push(c),
            }
        }
        params.push((key, value));
    }
    params
}

#[test]
fn upload() {
    init_tracing();

    let multipart = Multipart::new()
        .part(Part::text("param", "value"))
        .part(Part::reader("reader", "reader.txt", Cursor::new("readervalue")))
        .part(Part::file("file", fixture("file.txt")));

    assert_eq!(multipart.content_type(), "multipart/form-data; boundary=SlingFormBoundary0amF3aGVy");

    let mut actual = Vec::new();
    multipart.body().unwrap().read_to_end(&mut actual).unwrap();

    let expected = std::fs::read(fixture("expected.txt")).unwrap();
    assert_eq!(String::from_utf8_lossy(&actual), String::from_utf8_lossy(&expected));
    assert_eq!(actual, expected);
}

#[test]
fn upload_parses_back() {
    init_tracing();

    let multipart = Multipart::with_parts([
        Part::file("file", fixture("file.txt")),
        Part::reader("reader", "reader.txt", Cursor::new("readervalue")),
        Part::text("param", "value"),
    ]);
    let body = multipart.body().unwrap();
    let fields = parse(body.as_bytes(), multipart.boundary().as_str());

    let summary: Vec<_> = fields.iter().map(|f| (f.name.as_str(), f.filename.as_deref(), f.data.as_slice())).collect();
    assert_eq!(
        summary,
        [
            ("file", Some("file.txt"), &b"hello\n"[..]),
            ("reader", Some("reader.txt"), &b"readervalue"[..]),
            ("param", None, &b"value"[..]),
        ]
    );
    assert_eq!(fields[0].headers[0].0, "Content-Disposition");
    assert_eq!(fields[0].headers[1], ("Content-Type".to_owned(), "application/octet-stream".to_owned()));
    assert_eq!(fields[2].headers.len(), 1);
}

#[test]
fn escaped_names_parse_back() {
    init_tracing();

    let names = [r#"quote""#, r"back\slash", r#"\"both\""#, r#"a\\"b"#];
    let multipart: Multipart = names
        .iter()
        .map(|name| Part::bytes(*name, name.as_bytes().to_vec()).with_filename(format!("{name}.txt")))
        .collect();

    let body = multipart.body().unwrap();
    let fields = parse(body.as_bytes(), multipart.boundary().as_str());

    assert_eq!(fields.len(), names.len());
    for (field, name) in fields.iter().zip(names) {
        assert_eq!(field.name, name);
        assert_eq!(field.filename.as_deref(), Some(format!("{name}.txt").as_str()));
        assert_eq!(field.data, name.as_bytes());
    }
}

#[test]
fn empty_upload_is_valid() {
    let multipart = Multipart::new();
    let body = multipart.body().unwrap();

    assert_eq!(&body.as_bytes()[..], b"--SlingFormBoundary0amF3aGVy--\r\n");
    assert!(parse(body.as_bytes(), multipart.boundary().as_str()).is_empty());
}

#[test]
fn missing_file_fails_without_output() {
    init_tracing();

    let multipart = Multipart::with_parts([
        Part::text("param", "value"),
        Part::file("file", fixture("does-not-exist.txt")),
    ]);

    let err = multipart.body().unwrap_err();
    assert!(matches!(err, MultipartError::Open { ref part, .. } if part == "file"));
    assert!(err.is_not_found());
}

#[test]
fn random_boundary_round_trip() {
    let multipart = Multipart::new()
        .with_boundary(Boundary::random())
        .part(Part::bytes("blob", vec![0u8, 13, 10, 45, 45, 255]).with_content_type(mime::APPLICATION_OCTET_STREAM))
        .part(Part::text("note", "line one\r\nline two").with_header("Content-Language", "en"));

    let body = multipart.body().unwrap();
    assert!(body.content_type().ends_with(multipart.boundary().as_str()));

    let fields = parse(body.as_bytes(), multipart.boundary().as_str());
    assert_eq!(fields[0].data, [0u8, 13, 10, 45, 45, 255]);
    assert_eq!(fields[1].data, b"line one\r\nline two");
    assert_eq!(fields[1].headers[1], ("Content-Language".to_owned(), "en".to_owned()));
}
