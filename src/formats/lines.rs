//! Line framing over a chunked body

use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};
use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

pin_project! {
    /// Splits a stream of byte chunks into text lines.
    ///
    /// Lines end at `\n`; a trailing `\r` is dropped. A body that ends with a
    /// newline produces no trailing empty line, and an unterminated final
    /// line is still yielded once the body is exhausted.
    pub struct Lines<S> {
        #[pin]
        inner: S,
        buf: BytesMut,
        done: bool,
    }
}

impl<S> Lines<S>
where
    S: Stream<Item = Result<Bytes>>,
{
    /// Wrap a chunk stream
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            done: false,
        }
    }
}

impl<S> Stream for Lines<S>
where
    S: Stream<Item = Result<Bytes>>,
{
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(pos) = this.buf.iter().position(|b| *b == b'\n') {
                let mut line = this.buf.split_to(pos + 1);
                line.truncate(pos);
                return Poll::Ready(Some(into_line(line)));
            }

            if *this.done {
                if this.buf.is_empty() {
                    return Poll::Ready(None);
                }
                let rest = this.buf.split();
                return Poll::Ready(Some(into_line(rest)));
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => this.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => *this.done = true,
            }
        }
    }
}

fn into_line(mut line: BytesMut) -> Result<String> {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    String::from_utf8(line.to_vec())
        .map_err(|e| Error::decode(format!("Line is not valid UTF-8: {e}")))
}
