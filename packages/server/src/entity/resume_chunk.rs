use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One fixed-size slice of a resume's content.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resume_chunk")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub file_id: Uuid,
    /// 0-based sequence number.
    #[sea_orm(primary_key, auto_increment = false)]
    pub n: i32,
    #[sea_orm(belongs_to, from = "file_id", to = "id")]
    pub file: HasOne<super::resume_file::Entity>,

    pub data: Vec<u8>,
}

impl ActiveModelBehavior for ActiveModel {}
