//! Test that basic usage compiles successfully

use qentity::{PointId, PointModel, PointType, VectorMap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, PointModel)]
#[point_model(point_type = "article")]
pub struct Article {
    pub id: PointId,
    pub vector: Option<VectorMap>,
    pub title: String,
}

fn main() {
    assert_eq!(Article::POINT_TYPE, "article");

    let article = Article::default();
    let _point = article.to_qdrant(true);
}
