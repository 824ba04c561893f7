use crate::{
    model::{Stay, StayPatch},
    service::{Entity, EntityService},
};

impl Entity for Stay {
    type Patch = StayPatch;
}

pub type StayService = EntityService<Stay>;
