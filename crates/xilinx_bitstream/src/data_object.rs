//! The lazy, substitutable, re-packable tree node (§4.2).
//!
//! A [`DataObject`] is either `Packed` (raw bytes plus the arguments its
//! decoder needs) or `Unpacked` (a live model, cached bytes, and a dirty
//! flag). `pack()` short-circuits to the cached bytes whenever the model
//! hasn't been touched, which is what lets an untouched subtree round-trip
//! byte-for-byte even through vendor-specific encodings this crate doesn't
//! fully understand.

use std::cell::RefCell;

use crate::error::Result;

/// A model type that can be decoded from and re-encoded to raw bytes.
///
/// `DecodeArgs` carries whatever a decoder needs beyond the bytes
/// themselves (e.g. a [`crate::format::RegisterFormat`] reference for a
/// type-1 payload).
pub trait NodeModel: Sized {
    type DecodeArgs: Clone;

    fn decode(bytes: &[u8], args: &Self::DecodeArgs) -> Result<Self>;
    fn encode(&self) -> Result<Vec<u8>>;

    /// Walks this model's children, re-encoding any that are dirty.
    /// Returns whether this model itself (or any descendant) ended up
    /// dirty, so the caller can propagate the flag upward. Leaf models
    /// have no children and simply return `false`.
    fn synchronize_children(&self) -> Result<bool> {
        Ok(false)
    }
}

enum State<M: NodeModel> {
    Packed {
        bytes: Vec<u8>,
        args: M::DecodeArgs,
        /// Set by [`DataObject::set_bytes`]; a freshly-parsed Packed node
        /// starts `false`. Lets a direct byte-range patch propagate
        /// dirtiness upward even though the node itself has no model to
        /// mark dirty.
        changed: bool,
    },
    Unpacked {
        model: M,
        cached_bytes: Vec<u8>,
        dirty: bool,
    },
}

pub struct DataObject<M: NodeModel> {
    state: RefCell<State<M>>,
}

impl<M: NodeModel> DataObject<M> {
    pub fn new_packed(bytes: Vec<u8>, args: M::DecodeArgs) -> Self {
        Self {
            state: RefCell::new(State::Packed {
                bytes,
                args,
                changed: false,
            }),
        }
    }

    pub fn new_unpacked(model: M) -> Result<Self> {
        let cached_bytes = model.encode()?;
        Ok(Self {
            state: RefCell::new(State::Unpacked {
                model,
                cached_bytes,
                dirty: false,
            }),
        })
    }

    pub fn is_unpacked(&self) -> bool {
        matches!(&*self.state.borrow(), State::Unpacked { .. })
    }

    /// Ensures the node is unpacked, decoding it from its stored bytes if
    /// it was still packed. Idempotent.
    pub fn unpack(&self) -> Result<()> {
        let needs_decode = matches!(&*self.state.borrow(), State::Packed { .. });
        if !needs_decode {
            return Ok(());
        }
        let mut state = self.state.borrow_mut();
        if let State::Packed { bytes, args, changed } = &*state {
            let model = M::decode(bytes, args)?;
            let cached_bytes = bytes.clone();
            let dirty = *changed;
            *state = State::Unpacked {
                model,
                cached_bytes,
                dirty,
            };
        }
        Ok(())
    }

    /// Runs `f` against the unpacked model, unpacking first if needed.
    pub fn with_model<R>(&self, f: impl FnOnce(&M) -> R) -> Result<R> {
        self.unpack()?;
        let state = self.state.borrow();
        match &*state {
            State::Unpacked { model, .. } => Ok(f(model)),
            State::Packed { .. } => unreachable!("unpack() guarantees Unpacked state"),
        }
    }

    /// Runs `f` against the unpacked model mutably, marking the node dirty
    /// afterward. Unpacks first if needed.
    pub fn with_model_mut<R>(&self, f: impl FnOnce(&mut M) -> R) -> Result<R> {
        self.unpack()?;
        let mut state = self.state.borrow_mut();
        match &mut *state {
            State::Unpacked { model, dirty, .. } => {
                let result = f(model);
                *dirty = true;
                Ok(result)
            }
            State::Packed { .. } => unreachable!("unpack() guarantees Unpacked state"),
        }
    }

    /// Forces Packed state with new bytes, discarding any model. This is
    /// the low-level byte-range patch primitive used by modifiers.
    pub fn set_bytes(&self, bytes: Vec<u8>, args: M::DecodeArgs) {
        *self.state.borrow_mut() = State::Packed {
            bytes,
            args,
            changed: true,
        };
    }

    /// Returns the current byte representation: stored bytes if packed,
    /// cached bytes if unpacked and not dirty, or a freshly re-encoded
    /// buffer if dirty.
    pub fn pack(&self) -> Result<Vec<u8>> {
        self.synchronize()?;
        let state = self.state.borrow();
        match &*state {
            State::Packed { bytes, .. } => Ok(bytes.clone()),
            State::Unpacked { cached_bytes, .. } => Ok(cached_bytes.clone()),
        }
    }

    /// Recursively walks the tree and re-packs dirty subtrees so that
    /// `pack()` afterward yields a consistent buffer. Returns whether this
    /// node (or any descendant) was dirty, so a parent model can fold the
    /// flag upward from inside its own `synchronize_children`. A no-op on
    /// packed or already-clean nodes.
    pub fn synchronize(&self) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        match &mut *state {
            State::Unpacked {
                model,
                cached_bytes,
                dirty,
            } => {
                let children_dirty = model.synchronize_children()?;
                let was_dirty = *dirty || children_dirty;
                if was_dirty {
                    *cached_bytes = model.encode()?;
                    *dirty = false;
                }
                Ok(was_dirty)
            }
            State::Packed { changed, .. } => Ok(*changed),
        }
    }
}
