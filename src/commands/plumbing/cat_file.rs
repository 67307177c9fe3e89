use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GibleError;
use bytes::Bytes;

impl Repository {
    /// Full content of the blob `oid`, however it is stored
    pub async fn materialize(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        self.load_blob(oid)
    }

    /// Like [`Repository::materialize`] for a full or abbreviated blob id
    pub async fn cat_file(&self, object_id: &str) -> anyhow::Result<Bytes> {
        let mut candidates = self.database().find_objects_by_prefix(object_id)?;
        let oid = match candidates.len() {
            1 => candidates.remove(0),
            0 => ObjectId::try_parse(object_id.to_string())?,
            _ => {
                return Err(GibleError::AmbiguousRevision {
                    prefix: object_id.to_string(),
                    candidates: candidates.iter().map(ObjectId::to_short_oid).collect(),
                }
                .into());
            }
        };

        self.materialize(&oid).await
    }
}
