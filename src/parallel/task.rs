use super::signature::{BoundArgs, Signature};
use anyhow::Result;

/// A function that can be mapped over items
///
/// The signature names every parameter the function takes, including the one
/// that receives the item. Extra arguments are bound against it before any
/// work is dispatched and handed to each call as [`BoundArgs`].
pub trait Task: Send + Sync {
    type Item: Send + Sync;
    type Output: Send;

    fn signature(&self) -> &Signature;

    fn call(&self, item: &Self::Item, args: &BoundArgs) -> Result<Self::Output>;
}

/// Adapter turning a closure plus its parameter names into a [`Task`]
pub struct FnTask<T, R, F> {
    signature: Signature,
    func: F,
    _phantom: std::marker::PhantomData<fn(&T) -> R>,
}

impl<T, R, F> FnTask<T, R, F>
where
    F: Fn(&T, &BoundArgs) -> Result<R> + Send + Sync,
{
    pub fn new<I, S>(params: I, func: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            signature: Signature::new(params),
            func,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, R, F> Task for FnTask<T, R, F>
where
    T: Send + Sync,
    R: Send,
    F: Fn(&T, &BoundArgs) -> Result<R> + Send + Sync,
{
    type Item = T;
    type Output = R;

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, item: &T, args: &BoundArgs) -> Result<R> {
        (self.func)(item, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::Args;
    use serde_json::json;

    #[test]
    fn test_fn_task_forwards_item_and_args() {
        let task = FnTask::new(["x", "offset"], |x: &i64, args: &BoundArgs| {
            Ok(x + args.get::<i64>("offset")?)
        });
        assert_eq!(task.signature().arity(), 2);

        let mut args = Args::new();
        args.insert("offset", json!(5));
        let bound = args.bind(task.signature(), "x").unwrap();
        assert_eq!(task.call(&2, &bound).unwrap(), 7);
    }
}
