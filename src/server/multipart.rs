use crate::{
    error::{GenerationError, Result},
    models::{GenerateForm, UploadedImage},
};
use actix_multipart::{Field, Multipart};
use futures::StreamExt;

pub const UPLOAD_TOO_LARGE_MESSAGE: &str = "Upload too large";

fn parse_error(e: impl std::fmt::Display) -> GenerationError {
    GenerationError::InvalidInput(format!("Failed to parse multipart data: {}", e))
}

/// Reads the generate form. Only `prompt`, `model` and `images` are looked at;
/// the first occurrence of a text field wins and an `images` part only counts
/// as a file when it carries a filename.
pub async fn read_generate_form(mut payload: Multipart, max_bytes: usize) -> Result<GenerateForm> {
    let mut form = GenerateForm::default();
    let mut total = 0usize;

    while let Some(field) = payload.next().await {
        let field = field.map_err(parse_error)?;
        let name = field.name().to_string();

        match name.as_str() {
            "prompt" | "model" => {
                let data = read_field(field, &mut total, max_bytes).await?;
                let value = String::from_utf8_lossy(&data).into_owned();
                let slot = if name == "prompt" {
                    &mut form.prompt
                } else {
                    &mut form.model
                };
                if slot.is_none() {
                    *slot = Some(value);
                }
            }
            "images" => {
                let filename = field
                    .content_disposition()
                    .get_filename()
                    .map(String::from);
                let content_type = field.content_type().map(|mime| mime.to_string());
                let data = read_field(field, &mut total, max_bytes).await?;

                match filename {
                    Some(filename) => form.images.push(UploadedImage {
                        data,
                        content_type,
                        filename: Some(filename),
                    }),
                    None => log::debug!("Ignoring non-file 'images' part"),
                }
            }
            other => {
                log::debug!("Skipping unknown form field '{}'", other);
                read_field(field, &mut total, max_bytes).await?;
            }
        }
    }

    Ok(form)
}

async fn read_field(mut field: Field, total: &mut usize, max_bytes: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(parse_error)?;
        *total += chunk.len();
        if *total > max_bytes {
            log::warn!("Rejecting upload larger than {} bytes", max_bytes);
            return Err(GenerationError::InvalidInput(UPLOAD_TOO_LARGE_MESSAGE.into()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
