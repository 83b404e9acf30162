use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use simrpc_wire::{DecodeConfig, Request, Response, Value, WireError, RESPONSE};
use tracing::trace;

use crate::error::{ClientError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// One RPC session: encode, send, block for the response, validate, return.
///
/// Strictly synchronous — the calling thread is blocked for the full round
/// trip and at most one call is in flight per session. There is no internal
/// locking; concurrent callers must serialize externally or hold independent
/// sessions.
pub struct RpcSession<S> {
    stream: S,
    buf: BytesMut,
    decode: DecodeConfig,
    response_timeout: Option<Duration>,
}

impl<S: Read + Write> RpcSession<S> {
    /// Create a session over any bidirectional stream with default limits.
    pub fn new(stream: S) -> Self {
        Self::with_decode_config(stream, DecodeConfig::default())
    }

    /// Create a session with explicit decode limits.
    pub fn with_decode_config(stream: S, decode: DecodeConfig) -> Self {
        Self {
            stream,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            decode,
            response_timeout: None,
        }
    }

    /// Record the read deadline configured on the underlying stream so a
    /// deadline expiry surfaces as [`ClientError::Timeout`] instead of a raw
    /// I/O error. Does not itself arm any timer.
    pub fn set_response_timeout(&mut self, timeout: Option<Duration>) {
        self.response_timeout = timeout;
    }

    /// Invoke a remote method with call id `0`.
    ///
    /// The result payload is returned exactly as decoded — empty or
    /// degenerate results are the caller's to interpret.
    pub fn call(&mut self, method: &str, args: Vec<Value>) -> Result<Value> {
        self.call_with_id(0, method, args)
    }

    /// Invoke a remote method with an explicit correlation token.
    pub fn call_with_id(&mut self, call_id: u32, method: &str, args: Vec<Value>) -> Result<Value> {
        let request = Request::with_call_id(call_id, method, args);

        self.buf.clear();
        request.encode_to(&mut (&mut self.buf).writer())?;
        trace!(method, call_id, bytes = self.buf.len(), "sending call envelope");
        self.write_envelope()?;

        let response = match Response::decode_from_with(&mut self.stream, &self.decode) {
            Ok(response) => response,
            Err(err) => return Err(self.map_read_error(err)),
        };

        if response.message_type != RESPONSE {
            return Err(ClientError::NotAResponse {
                method: method.to_string(),
                got: response.message_type,
            });
        }
        if response.call_id != call_id {
            return Err(ClientError::CallIdMismatch {
                method: method.to_string(),
                expected: call_id,
                got: response.call_id,
            });
        }
        if response.is_error() {
            return Err(ClientError::Remote {
                method: method.to_string(),
                error: response.error,
            });
        }

        trace!(method, call_id, "call completed");
        Ok(response.result)
    }

    /// Write the encoded envelope in full before anything else may use the
    /// stream.
    fn write_envelope(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.stream.write(&self.buf[offset..]) {
                Ok(0) => return Err(WireError::ConnectionClosed.into()),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WireError::Io(err).into()),
            }
        }

        loop {
            match self.stream.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WireError::Io(err).into()),
            }
        }
    }

    fn map_read_error(&self, err: WireError) -> ClientError {
        if let Some(timeout) = self.response_timeout {
            if let WireError::Io(io) = &err {
                if matches!(io.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) {
                    return ClientError::Timeout(timeout);
                }
            }
        }
        err.into()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consume the session and return the inner stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> std::fmt::Debug for RpcSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcSession")
            .field("response_timeout", &self.response_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// Serves scripted response bytes and records everything written.
    struct ScriptedStream {
        input: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl ScriptedStream {
        fn replying(response: &Response) -> Self {
            let mut input = Vec::new();
            response.encode_to(&mut input).unwrap();
            Self::raw(input)
        }

        fn raw(input: Vec<u8>) -> Self {
            Self {
                input: Cursor::new(input),
                written: Vec::new(),
            }
        }

        fn sent_request(&self) -> Request {
            Request::decode_from(&mut Cursor::new(self.written.clone())).unwrap()
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn successful_call_returns_result() {
        let stream = ScriptedStream::replying(&Response::success(0, Value::Bool(true)));
        let mut session = RpcSession::new(stream);

        let result = session
            .call("armDisarm", vec![Value::Bool(true), Value::from("")])
            .unwrap();
        assert_eq!(result, Value::Bool(true));

        let request = session.get_ref().sent_request();
        assert_eq!(request.call_id, 0);
        assert_eq!(request.method, "armDisarm");
        assert_eq!(request.args, vec![Value::Bool(true), Value::from("")]);
    }

    #[test]
    fn explicit_call_id_is_echo_checked() {
        let stream = ScriptedStream::replying(&Response::success(9, Value::Nil));
        let mut session = RpcSession::new(stream);

        session.call_with_id(9, "reset", vec![]).unwrap();
        assert_eq!(session.get_ref().sent_request().call_id, 9);
    }

    #[test]
    fn wrong_message_type_is_protocol_violation() {
        // [0, 0, nil, true] — a request where a response should be.
        let mut input = Vec::new();
        Value::Array(vec![
            Value::Int(0),
            Value::Int(0),
            Value::Nil,
            Value::Bool(true),
        ])
        .encode_to(&mut input)
        .unwrap();

        let mut session = RpcSession::new(ScriptedStream::raw(input));
        let err = session.call("ping", vec![]).unwrap_err();

        assert!(matches!(err, ClientError::NotAResponse { got: 0, .. }));
        assert!(err.is_protocol_violation());
    }

    #[test]
    fn call_id_mismatch_is_protocol_violation() {
        let stream = ScriptedStream::replying(&Response::success(5, Value::Bool(true)));
        let mut session = RpcSession::new(stream);

        let err = session.call("armDisarm", vec![]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::CallIdMismatch {
                expected: 0,
                got: 5,
                ..
            }
        ));
        assert!(err.is_protocol_violation());
    }

    #[test]
    fn remote_error_is_surfaced_verbatim() {
        let stream = ScriptedStream::replying(&Response::failure(
            0,
            Value::from("vehicle not found"),
        ));
        let mut session = RpcSession::new(stream);

        let err = session.call("armDisarm", vec![]).unwrap_err();
        match err {
            ClientError::Remote { method, error } => {
                assert_eq!(method, "armDisarm");
                assert_eq!(error.as_str(), Some("vehicle not found"));
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[test]
    fn remote_error_wins_over_result_field() {
        // Both fields populated: error must be raised, result never consumed.
        let mut input = Vec::new();
        Value::Array(vec![
            Value::Int(1),
            Value::Int(0),
            Value::from("failed"),
            Value::Bool(true),
        ])
        .encode_to(&mut input)
        .unwrap();

        let mut session = RpcSession::new(ScriptedStream::raw(input));
        let err = session.call("takeoff", vec![]).unwrap_err();
        assert!(matches!(err, ClientError::Remote { .. }));
    }

    #[test]
    fn degenerate_result_passes_through() {
        for result in [Value::Nil, Value::Str(String::new()), Value::Array(vec![])] {
            let stream = ScriptedStream::replying(&Response::success(0, result.clone()));
            let mut session = RpcSession::new(stream);
            assert_eq!(session.call("reset", vec![]).unwrap(), result);
        }
    }

    #[test]
    fn result_passthrough_is_unmodified() {
        let result = Value::Map(vec![
            (Value::from("x_val"), Value::F64(1.25)),
            (Value::from("blob"), Value::Bin(vec![0, 1, 2, 255])),
            (Value::from("items"), Value::Array(vec![Value::Int(-7)])),
        ]);
        let stream = ScriptedStream::replying(&Response::success(0, result.clone()));
        let mut session = RpcSession::new(stream);

        assert_eq!(session.call("simGetImages", vec![]).unwrap(), result);
    }

    #[test]
    fn closed_stream_fails_the_call() {
        let mut session = RpcSession::new(ScriptedStream::raw(Vec::new()));
        let err = session.call("ping", vec![]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Wire(WireError::ConnectionClosed)
        ));
    }

    #[test]
    fn truncated_response_fails_the_call() {
        // Envelope header only, stream ends mid-value.
        let mut session = RpcSession::new(ScriptedStream::raw(vec![0x94, 0x01]));
        let err = session.call("ping", vec![]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Wire(WireError::ConnectionClosed)
        ));
    }

    #[test]
    fn zero_write_means_connection_closed() {
        struct ZeroWriter;

        impl Read for ZeroWriter {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Ok(0)
            }
        }

        impl Write for ZeroWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut session = RpcSession::new(ZeroWriter);
        let err = session.call("ping", vec![]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Wire(WireError::ConnectionClosed)
        ));
    }

    #[test]
    fn interrupted_write_is_retried() {
        struct InterruptedOnce {
            interrupted: bool,
            inner: ScriptedStream,
        }

        impl Read for InterruptedOnce {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                self.inner.read(buf)
            }
        }

        impl Write for InterruptedOnce {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.inner.write(buf)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                self.inner.flush()
            }
        }

        let stream = InterruptedOnce {
            interrupted: false,
            inner: ScriptedStream::replying(&Response::success(0, Value::Bool(true))),
        };
        let mut session = RpcSession::new(stream);

        let result = session.call("ping", vec![]).unwrap();
        assert_eq!(result, Value::Bool(true));
    }

    #[test]
    fn read_deadline_maps_to_timeout() {
        struct TimedOutReader;

        impl Read for TimedOutReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::WouldBlock))
            }
        }

        impl Write for TimedOutReader {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut session = RpcSession::new(TimedOutReader);
        session.set_response_timeout(Some(Duration::from_millis(50)));

        let err = session.call("ping", vec![]).unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }

    #[test]
    fn sequential_calls_reuse_the_session() {
        let mut input = Vec::new();
        Response::success(0, Value::Bool(true))
            .encode_to(&mut input)
            .unwrap();
        Response::success(0, Value::Int(3))
            .encode_to(&mut input)
            .unwrap();

        let mut session = RpcSession::new(ScriptedStream::raw(input));
        assert_eq!(session.call("ping", vec![]).unwrap(), Value::Bool(true));
        assert_eq!(
            session.call("getServerVersion", vec![]).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn roundtrip_over_socket_pair() {
        let (host, client) = std::os::unix::net::UnixStream::pair().unwrap();

        let server = std::thread::spawn(move || {
            let mut host = host;
            let request = Request::decode_from(&mut host).unwrap();
            assert_eq!(request.method, "ping");
            Response::success(request.call_id, Value::Bool(true))
                .encode_to(&mut host)
                .unwrap();
        });

        let mut session = RpcSession::new(client);
        let result = session.call("ping", vec![]).unwrap();
        assert_eq!(result, Value::Bool(true));

        server.join().unwrap();
    }
}
