use std::sync::Arc;

use log::{error, info, warn};
use tower::{Service, ServiceBuilder, ServiceExt};

use crate::config::SimulationConfig;
use crate::dispatch::Dispatcher;
use crate::metrics::RunSummary;
use crate::queue::{MessageSender, message_queue};
use crate::services::decode::DecodeLayer;
use crate::services::enqueue::EnqueueService;
use crate::services::validate::FloorBounds;
use crate::transport::{Transport, TransportError};
use crate::view::SchedulerView;

/// The central scheduler process: a receive task feeding the decision loop.
pub struct Scheduler<T> {
    transport: Arc<T>,
    dispatcher: Dispatcher,
    num_floors: u8,
}

impl<T> Scheduler<T>
where
    T: Transport + 'static,
{
    pub fn new(transport: T, config: &SimulationConfig, view: Box<dyn SchedulerView>) -> Self {
        Self {
            transport: Arc::new(transport),
            dispatcher: Dispatcher::new(config.capacity, config.floor_port, view),
            num_floors: config.num_floors,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<RunSummary> {
        info!("SCHEDULER: STARTED on port {}", self.transport.local_port());
        let (sender, mut queue) = message_queue();
        let receiver = tokio::spawn(receive_loop(
            Arc::clone(&self.transport),
            sender,
            self.num_floors,
        ));

        while let Some(messages) = queue.take_all().await {
            for message in messages {
                for outbound in self.dispatcher.handle(message) {
                    self.transport.send(&outbound.message, outbound.port).await;
                }
            }
            if self.dispatcher.all_elevators_gone() {
                info!("SCHEDULER: All elevators are finished running.");
                break;
            }
            if self.dispatcher.should_exit() {
                break;
            }
        }

        for outbound in self.dispatcher.shutdown() {
            self.transport.send(&outbound.message, outbound.port).await;
        }
        self.transport.close();
        receiver.await?;
        info!("SCHEDULER: Terminated.");

        let summary = self.dispatcher.summary();
        info!("{summary}");
        Ok(summary)
    }
}

async fn receive_loop<T: Transport>(transport: Arc<T>, sender: MessageSender, num_floors: u8) {
    let mut pipeline = ServiceBuilder::new()
        .layer(DecodeLayer)
        .filter(FloorBounds::new(num_floors))
        .service(EnqueueService::new(sender));

    loop {
        let datagram = match transport.receive_datagram(None).await {
            Ok(datagram) => datagram,
            Err(TransportError::Closed) => break,
            Err(TransportError::Timeout) => continue,
            Err(err) => {
                error!("SCHEDULER RECEIVER: {err}");
                break;
            }
        };

        let svc = match ServiceExt::<Vec<u8>>::ready(&mut pipeline).await {
            Ok(svc) => svc,
            Err(err) => {
                error!("SCHEDULER RECEIVER: pipeline unavailable: {err}");
                break;
            }
        };
        if let Err(err) = svc.call(datagram).await {
            warn!("SCHEDULER RECEIVER: dropped message: {err}");
        }
    }
    info!("SCHEDULER RECEIVER: Terminated.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::UdpTransport;
    use crate::types::message::Message;
    use crate::types::request::FloorRequest;
    use crate::types::state::{DoorState, ElevatorState, MotorState, Status};
    use crate::view::LogView;
    use std::time::Duration;

    const WAIT: Option<Duration> = Some(Duration::from_secs(2));

    fn report(floor: i32, motor: MotorState) -> Message {
        Message::ElevatorState(ElevatorState {
            id: 1,
            floor,
            motor,
            door: DoorState::Open,
            status: Status::Arrived,
        })
    }

    async fn start(config: &SimulationConfig) -> (u16, tokio::task::JoinHandle<anyhow::Result<RunSummary>>) {
        let transport = UdpTransport::bind(0, 0).await.unwrap();
        let port = transport.local_port();
        let scheduler = Scheduler::new(transport, config, Box::new(LogView::new("scheduler")));
        (port, tokio::spawn(scheduler.run()))
    }

    #[tokio::test]
    async fn registers_dispatches_and_shuts_down() {
        let floor = UdpTransport::bind(0, 0).await.unwrap();
        let config = SimulationConfig {
            floor_port: floor.local_port(),
            ..SimulationConfig::default()
        };
        let (scheduler_port, handle) = start(&config).await;
        let car = UdpTransport::bind(0, scheduler_port).await.unwrap();

        let register = Message::Register {
            id: 1,
            port: i32::from(car.local_port()),
        };
        assert_eq!(car.call_and_wait(&register, WAIT).await, Some(Message::EmptyReply));
        // first report from an idle car gets no answer
        car.send(&report(1, MotorState::Stopped), scheduler_port).await;

        let request = FloorRequest::new(0, 1, 3);
        floor
            .send(&Message::FloorRequest(request), scheduler_port)
            .await;
        assert_eq!(floor.receive(WAIT).await.unwrap(), Message::EmptyReply);
        assert_eq!(
            car.receive(WAIT).await.unwrap(),
            Message::RequestBatch(vec![request])
        );

        floor.send(&Message::Terminate, scheduler_port).await;
        assert_eq!(floor.receive(WAIT).await.unwrap(), Message::EmptyReply);

        car.send(&report(3, MotorState::Stopped), scheduler_port).await;
        assert_eq!(car.receive(WAIT).await.unwrap(), Message::Terminate);

        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.completions.len(), 1);
    }

    #[tokio::test]
    async fn garbage_and_out_of_range_messages_are_dropped() {
        let floor = UdpTransport::bind(0, 0).await.unwrap();
        let config = SimulationConfig {
            floor_port: floor.local_port(),
            num_floors: 5,
            ..SimulationConfig::default()
        };
        let (scheduler_port, handle) = start(&config).await;

        floor
            .send(&Message::FloorRequest(FloorRequest::new(0, 2, 9)), scheduler_port)
            .await;
        let raw = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        raw.send_to(&[99, 1, 2], ("127.0.0.1", scheduler_port)).await.unwrap();

        // only the terminate is acknowledged
        floor.send(&Message::Terminate, scheduler_port).await;
        assert_eq!(floor.receive(WAIT).await.unwrap(), Message::EmptyReply);
        assert!(matches!(
            floor.receive(Some(Duration::from_millis(100))).await,
            Err(TransportError::Timeout)
        ));

        let summary = handle.await.unwrap().unwrap();
        assert!(summary.completions.is_empty());
    }
}
