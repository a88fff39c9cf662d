use heapless::{
    spsc::{Consumer, Queue},
    Deque,
};

#[cfg(test)]
mod tests;

/// Non-blocking byte source drained by `Fs::write`.
pub trait ByteSource {
    /// Bytes buffered right now.
    fn available(&self) -> usize;

    /// Moves up to `buf.len()` buffered bytes into `buf` and returns the count.
    fn consume(&mut self, buf: &mut [u8]) -> usize;
}

impl<const N: usize> ByteSource for Deque<u8, N> {
    fn available(&self) -> usize {
        self.len()
    }

    fn consume(&mut self, buf: &mut [u8]) -> usize {
        let mut copied = 0usize;
        while copied < buf.len() {
            let Some(byte) = self.pop_front() else {
                break;
            };
            buf[copied] = byte;
            copied += 1;
        }
        copied
    }
}

impl<const N: usize> ByteSource for Queue<u8, N> {
    fn available(&self) -> usize {
        self.len()
    }

    fn consume(&mut self, buf: &mut [u8]) -> usize {
        drain_with(buf, || self.dequeue())
    }
}

impl<const N: usize> ByteSource for Consumer<'_, u8, N> {
    fn available(&self) -> usize {
        self.len()
    }

    fn consume(&mut self, buf: &mut [u8]) -> usize {
        drain_with(buf, || self.dequeue())
    }
}

impl<'a> ByteSource for &'a [u8] {
    fn available(&self) -> usize {
        self.len()
    }

    fn consume(&mut self, buf: &mut [u8]) -> usize {
        let data: &'a [u8] = *self;
        let take = buf.len().min(data.len());
        let (head, tail) = data.split_at(take);
        buf[..take].copy_from_slice(head);
        *self = tail;
        take
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn available(&self) -> usize {
        (**self).available()
    }

    fn consume(&mut self, buf: &mut [u8]) -> usize {
        (**self).consume(buf)
    }
}

fn drain_with(buf: &mut [u8], mut next: impl FnMut() -> Option<u8>) -> usize {
    let mut copied = 0usize;
    for slot in buf.iter_mut() {
        let Some(byte) = next() else {
            break;
        };
        *slot = byte;
        copied += 1;
    }
    copied
}
