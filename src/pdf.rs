//! Invoice PDF rendering.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::db::models::{Business, Invoice};

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 20.0;
const NOTE_MAX_LINES: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("font load failed: {0}")]
    Font(printpdf::Error),

    #[error("document write failed: {0}")]
    Write(printpdf::Error),

    #[error("document write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Render a single-page invoice document for the given business.
pub fn render_invoice_pdf(business: &Business, invoice: &Invoice) -> Result<Vec<u8>, PdfError> {
    let title = invoice
        .invoice_number
        .clone()
        .unwrap_or_else(|| invoice.id.to_string());
    let (doc, page, layer) = PdfDocument::new(
        format!("Invoice {}", title),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Invoice",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(PdfError::Font)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(PdfError::Font)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    push_line(&layer, &bold, &business.name, 18.0, y);
    y -= 8.0;
    for line in address_lines(business) {
        push_line(&layer, &regular, &line, 11.0, y);
        y -= 5.5;
    }
    y -= 6.0;

    push_line(&layer, &bold, &format!("Invoice {}", title), 14.0, y);
    y -= 8.0;
    push_line(&layer, &regular, &format!("Amount: ${:.2}", invoice.amount), 12.0, y);
    y -= 6.0;
    push_line(
        &layer,
        &regular,
        &format!("Status: {}", invoice.status.as_deref().unwrap_or("unpaid")),
        12.0,
        y,
    );
    y -= 6.0;
    if let Some(due_date) = &invoice.due_date {
        push_line(&layer, &regular, &format!("Due date: {}", due_date), 12.0, y);
        y -= 6.0;
    }

    if let Some(note) = invoice.note.as_deref().filter(|n| !n.trim().is_empty()) {
        y -= 4.0;
        push_line(&layer, &bold, "Note:", 12.0, y);
        y -= 6.0;
        for line in note.lines().take(NOTE_MAX_LINES) {
            push_line(&layer, &regular, line, 11.0, y);
            y -= 5.5;
        }
    }

    let terms = business.default_terms.as_deref().unwrap_or("Due on receipt");
    layer.use_text(terms, 10.0, Mm(MARGIN_MM), Mm(MARGIN_MM), &regular);

    let mut buffer = BufWriter::new(Vec::new());
    doc.save(&mut buffer).map_err(PdfError::Write)?;
    Ok(buffer.into_inner().map_err(|e| e.into_error())?)
}

fn push_line(
    layer: &printpdf::PdfLayerReference,
    font: &printpdf::IndirectFontRef,
    text: &str,
    font_size: f32,
    y: f32,
) {
    layer.use_text(text, font_size, Mm(MARGIN_MM), Mm(y), font);
}

/// Business address in display order, empty parts skipped.
fn address_lines(business: &Business) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(line1) = business.address_line1.as_deref().filter(|s| !s.is_empty()) {
        lines.push(line1.to_string());
    }
    if let Some(line2) = business.address_line2.as_deref().filter(|s| !s.is_empty()) {
        lines.push(line2.to_string());
    }
    let locality: Vec<&str> = [
        business.city.as_deref(),
        business.state.as_deref(),
        business.postal_code.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect();
    if !locality.is_empty() {
        lines.push(locality.join(", "));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_business() -> Business {
        Business {
            id: 1,
            owner_user_id: 1,
            name: "Acme Plumbing".to_string(),
            email: None,
            phone: None,
            address_line1: Some("1 Main St".to_string()),
            address_line2: None,
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            postal_code: Some("62704".to_string()),
            country: Some("US".to_string()),
            ein: None,
            logo_url: None,
            invoice_prefix: Some("INV-".to_string()),
            next_invoice_number: 2,
            default_terms: Some("Net 30".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_invoice() -> Invoice {
        Invoice {
            id: 7,
            user_id: 1,
            business_id: 1,
            job_id: None,
            amount: 1250.5,
            note: Some("Replaced water heater.\nHauled away old unit.".to_string()),
            status: Some("unpaid".to_string()),
            invoice_number: Some("INV-0001".to_string()),
            due_date: Some("2024-06-01".to_string()),
            pdf_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let bytes = render_invoice_pdf(&sample_business(), &sample_invoice()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn falls_back_to_id_when_number_missing() {
        let mut invoice = sample_invoice();
        invoice.invoice_number = None;
        invoice.note = None;
        invoice.due_date = None;
        let bytes = render_invoice_pdf(&sample_business(), &invoice).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn address_lines_skip_missing_parts() {
        let mut business = sample_business();
        business.address_line1 = None;
        business.state = None;
        let lines = address_lines(&business);
        assert_eq!(lines, vec!["Springfield, 62704".to_string()]);
    }
}
