pub(crate) mod sources;
pub(crate) mod verdict;
