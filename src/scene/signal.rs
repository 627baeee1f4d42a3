use std::{fmt, marker::PhantomData};

use crate::{
    color::model::Color,
    foundation::{
        core::Vec2,
        error::{RecalcError, RecalcResult},
    },
};

/// Typed handle to a value slot in a [`SignalStore`].
pub struct Signal<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Signal<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Slot index inside the store column for `T`.
    pub fn index(self) -> usize {
        self.index
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Signal<T> {}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal<{}>({})", std::any::type_name::<T>(), self.index)
    }
}

/// Types that can live in a [`SignalStore`].
pub trait SignalValue: Clone + 'static {
    /// Storage column for this type.
    fn column(store: &SignalStore) -> &Vec<Self>;
    /// Mutable storage column for this type.
    fn column_mut(store: &mut SignalStore) -> &mut Vec<Self>;
}

/// Flat storage for every animatable value in a scene.
///
/// Signals are plain slots: nothing is recomputed on write. Derived values are pulled when a
/// frame or a task needs them.
#[derive(Clone, Debug, Default)]
pub struct SignalStore {
    numbers: Vec<f64>,
    colors: Vec<Color>,
    texts: Vec<String>,
    vectors: Vec<Vec2>,
}

impl SignalStore {
    /// Allocate a new signal with an initial value.
    pub fn create<T: SignalValue>(&mut self, value: T) -> Signal<T> {
        let column = T::column_mut(self);
        column.push(value);
        Signal::new(column.len() - 1)
    }

    /// Read the current value.
    pub fn get<T: SignalValue>(&self, signal: Signal<T>) -> RecalcResult<&T> {
        T::column(self)
            .get(signal.index)
            .ok_or_else(|| RecalcError::evaluation(format!("unknown {signal:?}")))
    }

    /// Replace the current value.
    pub fn set<T: SignalValue>(&mut self, signal: Signal<T>, value: T) -> RecalcResult<()> {
        let slot = T::column_mut(self)
            .get_mut(signal.index)
            .ok_or_else(|| RecalcError::evaluation(format!("unknown {signal:?}")))?;
        *slot = value;
        Ok(())
    }
}

macro_rules! signal_column {
    ($ty:ty, $field:ident) => {
        impl SignalValue for $ty {
            fn column(store: &SignalStore) -> &Vec<Self> {
                &store.$field
            }

            fn column_mut(store: &mut SignalStore) -> &mut Vec<Self> {
                &mut store.$field
            }
        }
    };
}

signal_column!(f64, numbers);
signal_column!(Color, colors);
signal_column!(String, texts);
signal_column!(Vec2, vectors);

#[cfg(test)]
#[path = "../../tests/unit/scene/signal.rs"]
mod tests;
