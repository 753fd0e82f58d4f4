use crate::models::{
    ChatCompletionRequest, ChatMessage, ChatRole, ContentPart, EncodedImagePart,
    GenerationRequest, MessageContent,
};

/// Upstream never sees more than this many images, whatever the form carried.
pub const MAX_UPSTREAM_IMAGES: usize = 3;

pub const SYSTEM_INSTRUCTION: &str = "You are an image editor. Return an edited image as the primary output. Keep the subject consistent unless the user requests otherwise.";

pub fn build_payload(
    request: &GenerationRequest,
    images: Vec<EncodedImagePart>,
) -> ChatCompletionRequest {
    let mut content = Vec::with_capacity(1 + images.len().min(MAX_UPSTREAM_IMAGES));
    content.push(ContentPart::text(request.prompt.clone()));
    content.extend(
        images
            .into_iter()
            .take(MAX_UPSTREAM_IMAGES)
            .map(ContentPart::from),
    );

    ChatCompletionRequest {
        model: request.model_id.clone(),
        messages: vec![
            ChatMessage {
                role: ChatRole::System,
                content: MessageContent::Text(SYSTEM_INSTRUCTION.to_string()),
            },
            ChatMessage {
                role: ChatRole::User,
                content: MessageContent::Parts(content),
            },
        ],
        modalities: vec!["image".to_string(), "text".to_string()],
        stream: false,
    }
}
