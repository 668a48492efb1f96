use tempmail_extract::*;

#[test]
fn test_href_quote_styles() {
    let html = r#"<a HREF = 'https://a.example/x?y=1'>one</a> <a href="http://b.example">two</a>"#;
    assert_eq!(
        href_links(html),
        vec!["https://a.example/x?y=1", "http://b.example"]
    );
}

#[test]
fn test_href_without_http_ignored() {
    let html = r#"<a href="mailto:someone@example.com">mail</a> <a href="/local">x</a>"#;
    assert!(href_links(html).is_empty());
}

#[test]
fn test_href_redirect_value_kept_whole() {
    let html = r#"<a href="/redirect?u=https://t.example">go</a>"#;
    assert_eq!(href_links(html), vec!["/redirect?u=https://t.example"]);
}

#[test]
fn test_bare_link_components() {
    let text = "go to http://host.example:8080/a/b?x=1&y=2#top now";
    assert_eq!(
        bare_links(text),
        vec!["http://host.example:8080/a/b?x=1&y=2#top"]
    );
}

#[test]
fn test_wrapped_link() {
    let text = "https://ex.example/abc\ndef and more";
    assert_eq!(wrapped_links(text), vec!["https://ex.example/abcdef"]);
}

#[test]
fn test_wrapped_link_crlf() {
    let text = "https://ex.example/abc\r\ndef";
    assert_eq!(wrapped_links(text), vec!["https://ex.example/abcdef"]);
}

#[test]
fn test_single_line_url_is_not_wrapped() {
    assert!(wrapped_links("see https://ex.example/abc, then more").is_empty());
}

#[test]
fn test_wrapped_link_trailing_punctuation() {
    let text = "Open https://example.com/a/\nb/c). Thanks";
    assert_eq!(wrapped_links(text), vec!["https://example.com/a/b/c"]);
    assert_eq!(extract_links(text), vec!["https://example.com/a/b/c"]);
}

#[test]
fn test_bare_link_path_characters() {
    let text = "docs at https://example.com/my-page/~user/a%20b+c?q=x-y now";
    assert_eq!(
        bare_links(text),
        vec!["https://example.com/my-page/~user/a%20b+c?q=x-y"]
    );
}

#[test]
fn test_extract_links_first_seen_order() {
    let html = r#"<a href="https://b.example/">B</a> https://a.example/ https://b.example/"#;
    assert_eq!(
        extract_links(html),
        vec!["https://b.example/", "https://a.example/"]
    );
}

#[test]
fn test_extract_links_none() {
    assert!(extract_links("plain text, no links here").is_empty());
}

#[test]
fn test_link_set() {
    let mut set = LinkSet::new();
    assert!(set.insert("https://a.example"));
    assert!(set.insert("https://b.example"));
    assert!(!set.insert("https://a.example"));

    assert_eq!(set.len(), 2);
    assert!(set.contains("https://b.example"));
    assert_eq!(set.as_slice(), ["https://a.example", "https://b.example"]);
}

#[test]
fn test_link_set_from_iter() {
    let set: LinkSet = ["x", "y", "x", "z", "y"].into_iter().collect();
    assert_eq!(set.into_vec(), vec!["x", "y", "z"]);
}
