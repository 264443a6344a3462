/*!
 * End-to-end pipeline tests against mock providers.
 */

use std::sync::Arc;
use std::sync::atomic::Ordering;

use doctrans::docx::{Block, DocxDocument, DocxPackage, Paragraph};
use doctrans::pipeline::{PipelineState, TranslationJob, TranslationPipeline};
use doctrans::providers::mock::MockProvider;
use doctrans::providers::ChatRequest;
use doctrans::translation::{TranslationCache, TranslationService};

use crate::common;

fn pipeline_with(provider: MockProvider, target: &str) -> TranslationPipeline {
    let config = common::test_config(target);
    let service = TranslationService::with_provider(Arc::new(provider), config.translation.clone())
        .with_cache(TranslationCache::new(true));
    TranslationPipeline::with_service(config, Arc::new(service))
}

#[tokio::test]
async fn test_pipeline_lexiconToken_shouldSurviveTranslationVerbatim() {
    let package = common::package_from_document(&common::sample_document());
    let pipeline = pipeline_with(MockProvider::working(), "fr");

    let outcome = pipeline
        .run(&package, &TranslationJob::new(), |_, _| {})
        .await
        .unwrap();

    assert_eq!(outcome.report.state, PipelineState::Done);
    assert_eq!(outcome.report.total_units, 3);
    assert_eq!(outcome.report.translated_units, 3);

    let document = common::document_from_package(&outcome.package.unwrap());
    let texts: Vec<String> = document.paragraphs().map(|p| p.text()).collect();

    // Every paragraph was transformed, and the protected token survived
    assert!(texts.iter().all(|t| t.starts_with("[TR] ")));
    assert!(texts.iter().any(|t| t.contains("GitHub")));
    assert!(!texts.iter().any(|t| t.contains("__KEEP_")));
}

#[tokio::test]
async fn test_pipeline_muchLongerTranslation_shouldCollapseToSingleRun() {
    let document = DocxDocument {
        blocks: vec![Block::Paragraph(common::two_run_paragraph(
            "An introduction ",
            "with two runs of text in it for the formatting layer",
        ))],
    };
    let package = common::package_from_document(&document);

    // Respond with the input tripled, far past the length-delta threshold
    let provider = MockProvider::echo().with_custom_response(triple_response);
    let pipeline = pipeline_with(provider, "fr");

    let outcome = pipeline
        .run(&package, &TranslationJob::new(), |_, _| {})
        .await
        .unwrap();

    assert_eq!(outcome.report.reconstruction.single_run_rewrites, 1);

    let document = common::document_from_package(&outcome.package.unwrap());
    let paragraph = document.paragraphs().next().unwrap();
    assert_eq!(paragraph.runs.len(), 1);
}

fn triple_response(request: &ChatRequest) -> String {
    let text = request.user_text.trim();
    format!("{} {} {}", text, text, text)
}

#[tokio::test]
async fn test_pipeline_allRetriesFail_shouldKeepOriginalTextAndReportDegradation() {
    let package = common::package_from_document(&common::sample_document());
    let pipeline = pipeline_with(MockProvider::failing(), "fr");

    let outcome = pipeline
        .run(&package, &TranslationJob::new(), |_, _| {})
        .await
        .unwrap();

    // The run completes; nothing is translated, everything is reported
    assert_eq!(outcome.report.state, PipelineState::Done);
    assert_eq!(outcome.report.translated_units, 0);
    assert!(outcome.report.degraded_units.len() >= 1);

    let document = common::document_from_package(&outcome.package.unwrap());
    let texts: Vec<String> = document.paragraphs().map(|p| p.text()).collect();
    assert!(texts.contains(&"The source code lives on GitHub.".to_string()));
}

#[tokio::test]
async fn test_pipeline_droppedPlaceholder_shouldDegradeOnlyAffectedUnit() {
    let package = common::package_from_document(&common::sample_document());
    let pipeline = pipeline_with(MockProvider::dropping_placeholders(), "fr");

    let outcome = pipeline
        .run(&package, &TranslationJob::new(), |_, _| {})
        .await
        .unwrap();

    // Only the GitHub paragraph carries a placeholder, so only it degrades
    assert_eq!(outcome.report.degraded_units.len(), 1);
    assert_eq!(outcome.report.translated_units, 2);

    let document = common::document_from_package(&outcome.package.unwrap());
    let texts: Vec<String> = document.paragraphs().map(|p| p.text()).collect();
    assert!(texts.contains(&"The source code lives on GitHub.".to_string()));
}

#[tokio::test]
async fn test_pipeline_truncatedBatchResponse_shouldStillTranslateEveryUnit() {
    // Short paragraphs all land in one batch
    let document = DocxDocument {
        blocks: vec![
            Block::Paragraph(Paragraph::with_text("One.")),
            Block::Paragraph(Paragraph::with_text("Two.")),
            Block::Paragraph(Paragraph::with_text("Three.")),
        ],
    };
    let package = common::package_from_document(&document);
    let pipeline = pipeline_with(MockProvider::truncating_batches(), "fr");

    let outcome = pipeline
        .run(&package, &TranslationJob::new(), |_, _| {})
        .await
        .unwrap();

    assert_eq!(outcome.report.translated_units, 3);
    assert!(outcome.report.degraded_units.is_empty());
}

#[tokio::test]
async fn test_pipeline_secondRunOfSameDocument_shouldHitCacheEntirely() {
    let package = common::package_from_document(&common::sample_document());

    let provider = MockProvider::working();
    let calls = provider.call_counter();
    let pipeline = pipeline_with(provider, "fr");

    pipeline
        .run(&package, &TranslationJob::new(), |_, _| {})
        .await
        .unwrap();
    let calls_after_first = calls.load(Ordering::SeqCst);

    let outcome = pipeline
        .run(&package, &TranslationJob::new(), |_, _| {})
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), calls_after_first);
    assert_eq!(outcome.report.translated_units, 3);
}

#[tokio::test]
async fn test_pipeline_cancelledBeforeStart_shouldProduceNoOutput() {
    let package = common::package_from_document(&common::sample_document());

    let provider = MockProvider::working();
    let calls = provider.call_counter();
    let pipeline = pipeline_with(provider, "fr");

    let job = TranslationJob::new();
    job.cancel();

    let outcome = pipeline.run(&package, &job, |_, _| {}).await.unwrap();

    assert_eq!(outcome.report.state, PipelineState::Aborted);
    assert!(outcome.package.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pipeline_decoratedDocument_shouldKeepUnmodeledXml() {
    // Borders, grid, an inline image, and section properties are not part
    // of the in-memory model; translation must carry them through anyway
    let source_xml = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
        r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
        r#"<w:body>"#,
        r#"<w:p><w:r><w:t>Release notes</w:t></w:r></w:p>"#,
        r#"<w:tbl>"#,
        r#"<w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4"/></w:tblBorders></w:tblPr>"#,
        r#"<w:tblGrid><w:gridCol w:w="4788"/></w:tblGrid>"#,
        r#"<w:tr><w:tc><w:tcPr><w:tcW w:w="4788"/></w:tcPr>"#,
        r#"<w:p><w:r><w:t>Status</w:t></w:r></w:p></w:tc></w:tr>"#,
        r#"</w:tbl>"#,
        r#"<w:p><w:r><w:t>Figure one</w:t></w:r>"#,
        r#"<w:r><w:drawing><wp:inline><wp:extent cx="914400" cy="914400"/></wp:inline></w:drawing></w:r></w:p>"#,
        r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#,
        r#"</w:body></w:document>"#,
    );
    let package = DocxPackage::from_entries(vec![
        ("[Content_Types].xml".to_string(), b"<Types/>".to_vec()),
        ("word/document.xml".to_string(), source_xml.as_bytes().to_vec()),
    ]);
    let pipeline = pipeline_with(MockProvider::working(), "fr");

    let outcome = pipeline
        .run(&package, &TranslationJob::new(), |_, _| {})
        .await
        .unwrap();

    assert_eq!(outcome.report.state, PipelineState::Done);
    assert_eq!(outcome.report.translated_units, 3);

    let output = outcome.package.unwrap();
    let output_xml = String::from_utf8(output.document_xml().unwrap().to_vec()).unwrap();

    assert!(output_xml.contains("[TR] Release notes"));
    assert!(output_xml.contains("[TR] Status"));
    assert!(output_xml.contains(r#"<w:tblBorders><w:top w:val="single" w:sz="4"/></w:tblBorders>"#));
    assert!(output_xml.contains(r#"<w:tblGrid><w:gridCol w:w="4788"/></w:tblGrid>"#));
    assert!(output_xml.contains(r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#));
    assert!(output_xml.contains("<w:drawing>"));
}

#[tokio::test]
async fn test_pipeline_tableCells_shouldTranslateByCoordinates() {
    let document = DocxDocument {
        blocks: vec![Block::Table(common::table_of(&[
            &["Feature", "Supported"],
            &["Tables", "Yes"],
            &["Images", "Yes"],
        ]))],
    };
    let package = common::package_from_document(&document);
    let pipeline = pipeline_with(MockProvider::working(), "fr");

    let outcome = pipeline
        .run(&package, &TranslationJob::new(), |_, _| {})
        .await
        .unwrap();

    // Both "Yes" cells are distinct units and both get translated
    assert_eq!(outcome.report.total_units, 6);
    assert_eq!(outcome.report.translated_units, 6);

    let document = common::document_from_package(&outcome.package.unwrap());
    let table = document.tables().next().unwrap();
    assert_eq!(table.rows[1].cells[1].text(), "[TR] Yes");
    assert_eq!(table.rows[2].cells[1].text(), "[TR] Yes");
}
