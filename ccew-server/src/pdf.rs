//! Certificate rendering with lopdf — a single labelled A4 page built
//! from the canonical submission record. Layout is deliberately plain;
//! the record content is what the energy provider's intake cares about.

use async_trait::async_trait;
use ccew_core::{CertificateRenderer, DistributionError, SubmissionRecord};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

pub struct PdfCertificateRenderer;

fn joined(set: &std::collections::BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// The labelled lines printed on the certificate, in order.
fn field_lines(s: &SubmissionRecord) -> Vec<(&'static str, String)> {
    vec![
        ("Certificate serial", s.certificate_serial.clone()),
        ("Property", s.property_name.clone()),
        (
            "Installation address",
            format!(
                "{} {}, {} {} {}",
                s.street_number, s.street_name, s.suburb, s.state, s.post_code
            ),
        ),
        ("NMI", s.nmi.clone()),
        (
            "Customer",
            format!(
                "{} {} ({})",
                s.customer_first_name, s.customer_last_name, s.customer_company
            ),
        ),
        (
            "Customer address",
            format!(
                "{}, {} {} {}",
                s.customer_street, s.customer_suburb, s.customer_state, s.customer_post_code
            ),
        ),
        ("Installation type", s.installation_type.clone()),
        ("Work carried out", joined(&s.work_carried_out)),
        ("Special conditions", joined(&s.special_conditions)),
        (
            "Installer",
            format!("{} (licence {})", s.installer_company, s.installer_licence),
        ),
        (
            "Installer address",
            format!(
                "{}, {} {} {}",
                s.installer_street, s.installer_suburb, s.installer_state, s.installer_post_code
            ),
        ),
        ("Installer phone", s.installer_phone.clone()),
        (
            "Tester",
            format!("{} {}", s.tester_first_name, s.tester_last_name),
        ),
        (
            "Tester licence",
            format!("{} (expires {})", s.tester_licence, s.tester_licence_expiry),
        ),
        ("Test completed", s.test_date.clone()),
        ("Energy provider", s.energy_provider.clone()),
        ("Compliance affirmed", "Yes".to_string()),
    ]
}

fn build_document(submission: &SubmissionRecord) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 16.into()]),
        Operation::new("Td", vec![48.into(), 790.into()]),
        Operation::new(
            "Tj",
            vec![Object::string_literal(
                "Certificate of Compliance - Electrical Work",
            )],
        ),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
    ];
    for (label, value) in field_lines(submission) {
        operations.push(Operation::new("Td", vec![0.into(), (-18).into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(format!("{label}: {value}"))],
        ));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

#[async_trait]
impl CertificateRenderer for PdfCertificateRenderer {
    async fn render(&self, submission: &SubmissionRecord) -> Result<Vec<u8>, DistributionError> {
        build_document(submission).map_err(|e| DistributionError::Pdf {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn renders_a_parseable_pdf() {
        let mut submission = SubmissionRecord::default();
        submission.certificate_serial = "7".to_string();
        submission.energy_provider = "Ausgrid".to_string();

        let bytes = PdfCertificateRenderer.render(&submission).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // Round-trips through lopdf's own parser.
        lopdf::Document::load_mem(&bytes).unwrap();
    }
}
