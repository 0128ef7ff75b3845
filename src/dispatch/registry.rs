use super::ops::{BgrToGray, CvtColor, Morphology, Operation, WarpPerspective};
use crate::error::BindingError;
use crate::imgproc::MorphOp;
use std::collections::HashMap;
use std::sync::Arc;

/// Operation lookup by host-facing name.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    ops: HashMap<&'static str, Arc<dyn Operation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `bgrToGray`, `cvtColor`, `erode`, `dilate` and `warpPerspective`, plus
    /// the `toGrayscale` and `convertColorSpace` aliases.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let gray: Arc<dyn Operation> = Arc::new(BgrToGray);
        let cvt: Arc<dyn Operation> = Arc::new(CvtColor);
        registry.register(Arc::clone(&gray));
        registry.alias("toGrayscale", gray);
        registry.register(Arc::clone(&cvt));
        registry.alias("convertColorSpace", cvt);
        registry.register(Arc::new(Morphology(MorphOp::Erode)));
        registry.register(Arc::new(Morphology(MorphOp::Dilate)));
        registry.register(Arc::new(WarpPerspective));
        registry
    }

    pub fn register(&mut self, op: Arc<dyn Operation>) {
        self.ops.insert(op.name(), op);
    }

    pub fn alias(&mut self, name: &'static str, op: Arc<dyn Operation>) {
        self.ops.insert(name, op);
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn Operation>, BindingError> {
        self.ops.get(name).ok_or_else(|| {
            BindingError::invalid_argument(
                "operation",
                "registered operation name",
                format!("unknown operation '{name}'"),
            )
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.ops.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
