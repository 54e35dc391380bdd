//! Fixed-size re-chunking of upstream bodies
//!
//! Upstream bodies arrive in whatever frames the connection produces. The
//! gateway relays them in `chunk_size` pieces, holding at most one partial
//! chunk plus one upstream frame in memory. The stream is pulled by the
//! client side, so a slow client slows the upstream read.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, stream};

/// Re-slice a byte stream into chunks of exactly `chunk_size` bytes
///
/// The final chunk may be shorter. An upstream error is yielded once and
/// ends the stream; buffered bytes preceding it are discarded.
pub fn rechunk<S, E>(inner: S, chunk_size: usize) -> impl Stream<Item = Result<Bytes, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: Send,
{
    let chunk_size = chunk_size.max(1);
    let state = (Box::pin(inner), BytesMut::with_capacity(chunk_size), false);

    stream::unfold(state, move |(mut inner, mut buffer, mut done)| async move {
        loop {
            if buffer.len() >= chunk_size {
                let chunk = buffer.split_to(chunk_size).freeze();
                return Some((Ok(chunk), (inner, buffer, done)));
            }

            if done {
                if buffer.is_empty() {
                    return None;
                }
                let chunk = buffer.split().freeze();
                return Some((Ok(chunk), (inner, buffer, done)));
            }

            match inner.next().await {
                Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    buffer.clear();
                    return Some((Err(e), (inner, buffer, true)));
                }
                None => done = true,
            }
        }
    })
}
