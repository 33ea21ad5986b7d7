use super::ExtractionError;

/// Text of every page, in order.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map(|text| {
            text.lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))
}
