use common::{Document, DocumentId, DocumentMetadata};
use reqwest::{
    Method,
    multipart::{Form, Part},
};

use crate::{client::ApiClient, error::ApiError};

impl ApiClient {
    pub async fn list_position_documents(&self, position_id: i64) -> Result<Vec<Document>, ApiError> {
        let path = format!("/{}/position/{position_id}/documents", self.document_resource());
        self.get_json(&path, &[]).await
    }

    pub async fn delete_document(&self, id: DocumentId) -> Result<(), ApiError> {
        let path = format!("/{}/documents/{id}", self.document_resource());
        self.delete(&path).await
    }

    pub async fn update_document(
        &self,
        id: DocumentId,
        metadata: &DocumentMetadata,
    ) -> Result<(), ApiError> {
        let path = format!("/{}/documents/{id}", self.document_resource());
        let req = self.request(Method::PUT, &path, &[], true)?.json(metadata);
        self.execute(req, Method::PUT, &path).await.map(drop)
    }

    /// Uploads every document carrying a file in one multipart request.
    /// Documents without a file are not sent.
    pub async fn create_documents(
        &self,
        batch_year: i32,
        position_id: i64,
        documents: &[Document],
    ) -> Result<usize, ApiError> {
        let form = upload_form(documents)?;
        let Some((form, count)) = form else {
            return Ok(0);
        };
        let path = format!(
            "/{}/batch/{batch_year}/position/{position_id}/documents",
            self.document_resource()
        );
        let req = self.request(Method::POST, &path, &[], true)?.multipart(form);
        self.execute(req, Method::POST, &path).await?;
        Ok(count)
    }
}

/// Repeated `documents`, `document_types`, `document_titles` and
/// `display_orders` fields, one group per uploaded file.
fn upload_form(documents: &[Document]) -> Result<Option<(Form, usize)>, ApiError> {
    let mut form = Form::new();
    let mut count = 0usize;
    for doc in documents {
        let Some(file) = &doc.new_file else {
            continue;
        };
        let part = Part::bytes(file.bytes.clone())
            .file_name(multipart_file_name(&file.file_name))
            .mime_str(&file.content_type)
            .map_err(|source| ApiError::Multipart {
                file_name: file.file_name.clone(),
                source,
            })?;
        form = form
            .part("documents", part)
            .text("document_types", doc.document_type.as_str())
            .text("document_titles", doc.document_title.clone())
            .text("display_orders", doc.display_order.to_string());
        count += 1;
    }
    Ok((count > 0).then_some((form, count)))
}

/// Quotes, backslashes and line breaks would corrupt the part's
/// `Content-Disposition` header.
fn multipart_file_name(file_name: &str) -> String {
    file_name
        .replace('"', "'")
        .replace('\\', "_")
        .replace(['\r', '\n'], "")
}
