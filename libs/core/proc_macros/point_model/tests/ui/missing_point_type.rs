use qentity::{PointId, PointModel, VectorMap};

#[derive(PointModel)]
pub struct Untagged {
    pub id: PointId,
    pub vector: Option<VectorMap>,
}

fn main() {}
