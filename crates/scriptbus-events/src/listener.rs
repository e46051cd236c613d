use std::sync::Arc;

/// Result returned by every listener callback
pub type ListenerResult = anyhow::Result<()>;

/// A single-method listener taking its arguments as a tuple.
///
/// `Listener<()>` is the zero-argument shape, `Listener<(A,)>` takes one
/// argument, and so on up to five. Closures of the matching arity implement
/// this trait directly, so `Arc::new(|a: u32| Ok(()))` can be added to a bus
/// expecting `Listener<(u32,)>`.
pub trait Listener<Args>: Send + Sync {
    fn on_event(&self, args: Args) -> ListenerResult;
}

/// Shared handle to a listener.
///
/// Buses compare handles by pointer, so keep the handle returned from `add`
/// if the listener needs to be removed later.
pub type ListenerHandle<Args> = Arc<dyn Listener<Args>>;

impl<F> Listener<()> for F
where
    F: Fn() -> ListenerResult + Send + Sync,
{
    fn on_event(&self, _args: ()) -> ListenerResult {
        self()
    }
}

macro_rules! impl_listener_for_fn {
    ($($arg:ident),+) => {
        impl<F, $($arg),+> Listener<($($arg,)+)> for F
        where
            F: Fn($($arg),+) -> ListenerResult + Send + Sync,
        {
            #[allow(non_snake_case)]
            fn on_event(&self, ($($arg,)+): ($($arg,)+)) -> ListenerResult {
                self($($arg),+)
            }
        }
    };
}

impl_listener_for_fn!(A);
impl_listener_for_fn!(A, B);
impl_listener_for_fn!(A, B, C);
impl_listener_for_fn!(A, B, C, D);
impl_listener_for_fn!(A, B, C, D, E);
