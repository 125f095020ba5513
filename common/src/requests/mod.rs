use serde::Deserialize;

#[derive(Deserialize)]
/// Body accepted by `PUT /api/shoppingLists/{list_id}`.
///
/// Clients may send the whole record back; everything except `notes` is
/// ignored, since the rest of a generation record is immutable.
pub struct UpdateNotesRequest {
    pub notes: String,
}
