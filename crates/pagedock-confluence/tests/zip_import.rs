//! End-to-end tests for the HTML-export import path.

use std::io::Write;

use pagedock_confluence::{CancelToken, ImportError, ZipImporter};
use pagedock_model::ContentBlock;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn page_html(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{title} - Confluence</title></head>\
         <body><div id=\"main-content\">{body}</div></body></html>"
    )
}

fn build_export(entries: &[(&str, String)]) -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
    let mut writer = ZipWriter::new(file.reopen().unwrap());
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    file
}

fn sample_export() -> tempfile::NamedTempFile {
    let index = "<html><body>\
                 <a href=\"./second.html\">Second</a>\
                 <a href=\"first.html#anchor\">First</a>\
                 </body></html>"
        .to_owned();

    let first = page_html(
        "First",
        r#"<p>Plain text</p><ac:structured-macro ac:name="code"><ac:parameter ac:name="language">c#</ac:parameter><ac:plain-text-body>var x = 1;</ac:plain-text-body></ac:structured-macro>"#,
    );

    let second = page_html(
        "Second",
        r#"<ac:structured-macro ac:name="info"><ac:rich-text-body><p>Note this</p></ac:rich-text-body></ac:structured-macro><ac:image ac:alt="Logo"><ri:attachment ri:filename="logo.png" /></ac:image>"#,
    );

    // Breadcrumb trail Home > A > B: the second-to-last link names A's page
    let space_home = page_html("Space A", "<p>Space home</p>");
    let structural = page_html("Structural", "<p>Directory guess</p>");
    let nested = "<html><head><title>Nested - Confluence</title></head><body>\
                  <ol class=\"breadcrumbs\">\
                  <li><a href=\"index.html\">Home</a></li>\
                  <li><a href=\"A.html\">A</a></li>\
                  <li><a href=\"page.html\">B</a></li>\
                  </ol>\
                  <div id=\"main-content\"><p>Nested content</p></div></body></html>"
        .to_owned();

    build_export(&[
        ("index.html", index),
        ("first.html", first),
        ("second.html", second),
        ("A/A.html", space_home),
        ("A/B.html", structural),
        ("A/B/page.html", nested),
        ("empty.html", "<html><body>   </body></html>".to_owned()),
        ("__MACOSX/._first.html", "junk".to_owned()),
    ])
}

#[test]
fn test_full_import_reports_partial_success() {
    let zip = sample_export();
    let outcome = ZipImporter::new("en")
        .import(zip.path(), &CancelToken::new())
        .unwrap();

    assert_eq!(outcome.report.pages_imported, 5);
    assert_eq!(outcome.report.pages_skipped.len(), 1);
    assert_eq!(outcome.report.pages_skipped[0].source, "empty.html");
    assert_eq!(outcome.report.pages_skipped[0].reason, "no body content");
}

#[test]
fn test_manifest_defines_page_order() {
    let zip = sample_export();
    let outcome = ZipImporter::new("en")
        .import(zip.path(), &CancelToken::new())
        .unwrap();

    let titles: Vec<&str> = outcome
        .format
        .pages
        .iter()
        .map(|page| page.title.as_str())
        .collect();

    // Manifest lists second.html before first.html; unlisted pages follow
    assert_eq!(titles[0], "Second");
    assert_eq!(titles[1], "First");
    assert_eq!(
        outcome.format.pages[0].metadata.source_order,
        Some(0),
    );
    assert_eq!(
        outcome.format.pages[1].metadata.source_order,
        Some(1),
    );
    // Pages absent from the manifest sort after all listed ones
    assert!(outcome.format.pages[2].metadata.source_order.unwrap() > 1);
}

#[test]
fn test_breadcrumb_overrides_directory_parent() {
    let zip = sample_export();
    let outcome = ZipImporter::new("en")
        .import(zip.path(), &CancelToken::new())
        .unwrap();

    let space_home = outcome.format.page_by_source_file("A/A.html").unwrap();
    let nested = outcome.format.page_by_source_file("A/B/page.html").unwrap();

    // Directory inference would have chosen A/B.html
    assert_eq!(
        nested.parent_unique_id.as_ref(),
        Some(&space_home.unique_id)
    );
    assert_eq!(nested.parent_slug, space_home.slug);
}

#[test]
fn test_macros_and_media_convert() {
    let zip = sample_export();
    let outcome = ZipImporter::new("en")
        .import(zip.path(), &CancelToken::new())
        .unwrap();

    let first = outcome.format.page_by_source_file("first.html").unwrap();
    assert!(first.content_blocks.iter().any(|block| matches!(
        block,
        ContentBlock::Code { language: Some(language), .. } if language == "csharp"
    )));

    let second = outcome.format.page_by_source_file("second.html").unwrap();
    assert!(second
        .content_blocks
        .iter()
        .any(|block| matches!(block, ContentBlock::Panel { .. })));
    assert!(second
        .content_blocks
        .iter()
        .any(|block| matches!(block, ContentBlock::Image { .. })));

    let media = &outcome.format.media_downloads;
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].target_filename, "logo.png");
    assert_eq!(media[0].page_slug, second.slug);
}

#[test]
fn test_reimport_is_deterministic_modulo_unique_ids() {
    let zip = sample_export();
    let importer = ZipImporter::new("en");
    let first_run = importer.import(zip.path(), &CancelToken::new()).unwrap();
    let second_run = importer.import(zip.path(), &CancelToken::new()).unwrap();

    let shape = |outcome: &pagedock_confluence::ImportOutcome| {
        outcome
            .format
            .pages
            .iter()
            .map(|page| {
                (
                    page.title.clone(),
                    page.slug.clone(),
                    page.parent_slug.clone(),
                    page.metadata.source_order,
                    page.content_blocks.clone(),
                )
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(shape(&first_run), shape(&second_run));

    // Unique ids are freshly generated per run
    assert_ne!(
        first_run.format.pages[0].unique_id,
        second_run.format.pages[0].unique_id
    );
}

#[test]
fn test_cancellation_between_pages() {
    let zip = sample_export();
    let token = CancelToken::new();
    token.cancel();

    let err = ZipImporter::new("en").import(zip.path(), &token).unwrap_err();
    assert!(matches!(err, ImportError::Cancelled));
}

#[test]
fn test_media_dedupe_is_opt_in() {
    let body = r#"<ac:image><ri:attachment ri:filename="shared.png" /></ac:image>"#;
    let export = build_export(&[
        ("one.html", page_html("One", body)),
        ("two.html", page_html("Two", body)),
    ]);

    let duplicated = ZipImporter::new("en")
        .import(export.path(), &CancelToken::new())
        .unwrap();
    assert_eq!(duplicated.format.media_downloads.len(), 2);

    let deduped = ZipImporter::new("en")
        .with_dedupe_media(true)
        .import(export.path(), &CancelToken::new())
        .unwrap();
    assert_eq!(deduped.format.media_downloads.len(), 1);
}
