use qentity::{PointId, PointModel};

#[derive(PointModel)]
#[point_model(point_type = "bare")]
pub struct Bare {
    pub id: PointId,
}

fn main() {}
