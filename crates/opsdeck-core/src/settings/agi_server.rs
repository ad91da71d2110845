// ── FastAGI server template ──

use super::IvrSettings;

pub const AGI_SERVER_FILE_NAME: &str = "agi_server.py";

const TEMPLATE: &str = r#"#!/usr/bin/env python3
"""
Asterisk Python AGI Server
FastAGI server that runs the generated IVR handler for each connection.
"""

import socket
import threading
import logging
from asterisk.agi import AGI

from ivr_handler import IVRHandler


class AGIServer:
    def __init__(self, host='__HOST__', port=__PORT__, max_connections=__MAX_CONNECTIONS__, timeout=__TIMEOUT__):
        self.host = host
        self.port = port
        self.timeout = timeout
        self.slots = threading.BoundedSemaphore(max_connections)
        self.sock = socket.socket(socket.AF_INET, socket.SOCK_STREAM)
        self.sock.setsockopt(socket.SOL_SOCKET, socket.SO_REUSEADDR, 1)

        logging.basicConfig(level=logging.INFO)
        self.logger = logging.getLogger(__name__)

    def start(self):
        self.sock.bind((self.host, self.port))
        self.sock.listen(5)
        self.logger.info(f"AGI Server listening on {self.host}:{self.port}")

        while True:
            try:
                conn, addr = self.sock.accept()
                if not self.slots.acquire(blocking=False):
                    self.logger.warning(f"Connection limit reached, rejecting {addr}")
                    conn.close()
                    continue
                self.logger.info(f"Connection from {addr}")
                conn.settimeout(self.timeout)

                thread = threading.Thread(
                    target=self.handle_connection,
                    args=(conn, addr)
                )
                thread.daemon = True
                thread.start()

            except Exception as e:
                self.logger.error(f"Server error: {e}")

    def handle_connection(self, conn, addr):
        try:
            stream = conn.makefile('rw')
            agi = AGI(stdin=stream, stdout=stream)
            IVRHandler(agi).run()
        except Exception as e:
            self.logger.error(f"Connection error: {e}")
        finally:
            conn.close()
            self.slots.release()


if __name__ == '__main__':
    server = AGIServer()
    server.start()
"#;

/// Render `agi_server.py`, bound to the configured AGI host and port.
pub fn render_agi_server(settings: &IvrSettings) -> String {
    let agi = &settings.agi;
    TEMPLATE
        .replace("__HOST__", &agi.host)
        .replace("__PORT__", &agi.port.to_string())
        .replace("__MAX_CONNECTIONS__", &agi.max_connections.to_string())
        .replace("__TIMEOUT__", &agi.timeout.to_string())
}
