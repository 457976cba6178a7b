use qentity::{PointId, PointModel, VectorMap};

#[derive(PointModel)]
#[point_model(point_type = "shadow")]
pub struct Shadow {
    pub id: PointId,
    pub vector: Option<VectorMap>,
    pub point_type: String,
}

fn main() {}
