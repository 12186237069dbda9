mod distribute;

pub use distribute::DistributeAroundY;
