use qentity::{PointId, PointModel, VectorMap};

#[derive(PointModel)]
#[point_model(point_type = "")]
pub struct Blank {
    pub id: PointId,
    pub vector: Option<VectorMap>,
}

fn main() {}
