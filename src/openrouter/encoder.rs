use crate::{
    error::{GenerationError, Result},
    models::{EncodedImagePart, UploadedImage},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;

pub const UNSUPPORTED_FILE_MESSAGE: &str = "Only image files are supported";

/// Turns one upload into a `data:<media>;base64,<payload>` part. Bytes are passed
/// through untouched.
pub fn encode_image(image: &UploadedImage) -> Result<EncodedImagePart> {
    let media_type = image
        .content_type
        .as_deref()
        .filter(|media_type| media_type.starts_with("image/"))
        .ok_or_else(|| {
            log::warn!(
                "Rejecting upload {} with media type {:?}",
                image.display_name(),
                image.content_type
            );
            GenerationError::EncodingError(UNSUPPORTED_FILE_MESSAGE.into())
        })?;

    let payload = STANDARD.encode(&image.data);
    Ok(EncodedImagePart {
        url: format!("data:{};base64,{}", media_type, payload),
    })
}

/// Encodes every image on the blocking pool and waits for all of them. Any single
/// failure fails the whole batch; output order matches input order.
pub async fn encode_images(images: Vec<UploadedImage>) -> Result<Vec<EncodedImagePart>> {
    let tasks = images.into_iter().map(|image| async move {
        match tokio::task::spawn_blocking(move || encode_image(&image)).await {
            Ok(encoded) => encoded,
            Err(e) => Err(GenerationError::InternalError(format!(
                "Image encoding task failed: {}",
                e
            ))),
        }
    });

    try_join_all(tasks).await
}
