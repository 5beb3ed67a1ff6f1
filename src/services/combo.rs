use crate::error::ApiError;
use crate::http::{HttpClient, MultipartForm};
use crate::models::{Combo, ComboForm, RecordId};

pub async fn list_combos(client: &HttpClient) -> Result<Option<Vec<Combo>>, ApiError> {
    client.get("/combo").await
}

pub async fn get_combo(client: &HttpClient, id: &RecordId) -> Result<Option<Combo>, ApiError> {
    client.get(&format!("/combo/{}", id.path_segment())).await
}

// Combo writes carry an image, so they go out as form-data
pub async fn create_combo(client: &HttpClient, form: ComboForm) -> Result<Option<Combo>, ApiError> {
    client.post_multipart("/combo", combo_form(form)).await
}

pub async fn update_combo(
    client: &HttpClient,
    id: &RecordId,
    form: ComboForm,
) -> Result<Option<Combo>, ApiError> {
    client
        .put_multipart(
            &format!("/combo/{}", id.path_segment()),
            combo_form(form),
        )
        .await
}

pub async fn delete_combo(client: &HttpClient, id: &RecordId) -> Result<(), ApiError> {
    client.delete(&format!("/combo/{}", id.path_segment())).await
}

fn combo_form(form: ComboForm) -> MultipartForm {
    let mut multipart = MultipartForm::new()
        .text("name", form.name)
        .text("price", form.price);
    if let Some(description) = form.description {
        multipart = multipart.text("description", description);
    }
    for (name, value) in form.extra_fields {
        multipart = multipart.text(&name, value);
    }
    if let Some(image) = form.image {
        multipart = multipart.file("image", &image.file_name, &image.content_type, image.bytes);
    }
    multipart
}
